//! Voice catalogue endpoints.

use super::{ApiClient, ApiError};
use crate::models::{CustomVoiceRequest, Voice};

impl ApiClient {
    pub async fn list_voices(&self) -> Result<Vec<Voice>, ApiError> {
        self.get("/voice").await
    }

    /// Register a provider voice id under a display name.
    pub async fn add_custom_voice(&self, request: &CustomVoiceRequest) -> Result<Voice, ApiError> {
        self.post("/voice/custom", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_add_custom_voice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/voice/custom"))
            .and(body_json(json!({
                "provider": "elevenlabs", "voice_id": "abc123", "name": "Support"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "v9", "name": "Support", "provider": "elevenlabs", "custom": true
            })))
            .mount(&server)
            .await;

        let voice = client_for(&server)
            .add_custom_voice(&CustomVoiceRequest {
                provider: "elevenlabs".to_string(),
                voice_id: "abc123".to_string(),
                name: "Support".to_string(),
            })
            .await
            .unwrap();
        assert!(voice.custom);
    }
}
