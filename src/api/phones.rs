//! `/phones` endpoints.

use super::{ApiClient, ApiError};
use crate::models::{PhoneImport, PhoneNumber, PhoneUpdate};

impl ApiClient {
    pub async fn list_phones(&self) -> Result<Vec<PhoneNumber>, ApiError> {
        self.get("/phones").await
    }

    /// Connect an existing carrier number to the platform.
    pub async fn import_phone(&self, request: &PhoneImport) -> Result<PhoneNumber, ApiError> {
        let phone: PhoneNumber = self.post("/phones", request).await?;
        tracing::info!(phone_id = %phone.id, provider = %phone.provider, "Imported phone number");
        Ok(phone)
    }

    pub async fn update_phone(
        &self,
        id: &str,
        update: &PhoneUpdate,
    ) -> Result<PhoneNumber, ApiError> {
        self.patch(&format!("/phones/{}", id), update).await
    }

    /// Route inbound calls on a number to an agent, or to nobody.
    pub async fn assign_phone_agent(
        &self,
        id: &str,
        agent_id: Option<&str>,
    ) -> Result<PhoneNumber, ApiError> {
        let update = PhoneUpdate {
            agent_id: Some(agent_id.map(str::to_string)),
            label: None,
        };
        self.update_phone(id, &update).await
    }

    pub async fn delete_phone(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/phones/{}", id)).await
    }
}
