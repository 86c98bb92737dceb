//! Onboarding completion endpoint.

use super::{ApiClient, ApiError};
use crate::onboarding::{OnboardingConfig, OnboardingResult};

impl ApiClient {
    /// Submit the wizard result; the server provisions phone, agent and tools.
    pub async fn complete_onboarding(
        &self,
        config: &OnboardingConfig,
    ) -> Result<OnboardingResult, ApiError> {
        let result: OnboardingResult = self.post("/onboarding", config).await?;
        tracing::info!(agent_id = ?result.agent_id, "Onboarding completed");
        Ok(result)
    }
}
