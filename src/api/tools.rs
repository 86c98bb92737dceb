//! `/tools` and `/calendars` endpoints.

use std::collections::BTreeMap;

use super::{ApiClient, ApiError};
use crate::models::{Calendar, Tool, ToolDraft, ToolKind};

impl ApiClient {
    pub async fn list_tools(&self) -> Result<Vec<Tool>, ApiError> {
        self.get("/tools").await
    }

    pub async fn create_tool(&self, draft: &ToolDraft) -> Result<Tool, ApiError> {
        self.post("/tools", draft).await
    }

    pub async fn update_tool(&self, id: &str, draft: &ToolDraft) -> Result<Tool, ApiError> {
        self.put(&format!("/tools/{}", id), draft).await
    }

    pub async fn delete_tool(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/tools/{}", id)).await
    }

    /// Store credentials for an app integration.
    ///
    /// Always re-reads the tool list first and merges into the existing app
    /// tool when there is one, so concurrent edits from elsewhere survive.
    pub async fn save_app_credentials(
        &self,
        app: &str,
        display_name: &str,
        credentials: BTreeMap<String, String>,
    ) -> Result<Tool, ApiError> {
        let tools = self.list_tools().await?;

        match tools.iter().find(|t| t.app_name() == Some(app)) {
            Some(existing) => {
                let mut draft = ToolDraft::from(existing);
                if let ToolKind::App {
                    credentials: current,
                    ..
                } = &mut draft.kind
                {
                    current.extend(credentials);
                }
                tracing::debug!(tool_id = %existing.id, app, "Merging app credentials");
                self.update_tool(&existing.id, &draft).await
            }
            None => {
                let draft = ToolDraft {
                    name: display_name.to_string(),
                    description: String::new(),
                    kind: ToolKind::App {
                        app: app.to_string(),
                        credentials,
                    },
                };
                tracing::debug!(app, "Creating app tool");
                self.create_tool(&draft).await
            }
        }
    }

    pub async fn list_calendars(&self) -> Result<Vec<Calendar>, ApiError> {
        self.get("/calendars").await
    }
}
