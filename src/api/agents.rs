//! `/agent` endpoints.

use super::{ApiClient, ApiError};
use crate::models::{Agent, AgentDraft};

impl ApiClient {
    pub async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        self.get("/agent").await
    }

    pub async fn get_agent(&self, id: &str) -> Result<Agent, ApiError> {
        self.get(&format!("/agent/{}", id)).await
    }

    pub async fn create_agent(&self, draft: &AgentDraft) -> Result<Agent, ApiError> {
        let agent: Agent = self.post("/agent", draft).await?;
        tracing::info!(agent_id = %agent.id, name = %agent.name, "Created agent");
        Ok(agent)
    }

    pub async fn update_agent(&self, id: &str, draft: &AgentDraft) -> Result<Agent, ApiError> {
        self.put(&format!("/agent/{}", id), draft).await
    }

    pub async fn delete_agent(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/agent/{}", id)).await?;
        tracing::info!(agent_id = %id, "Deleted agent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::client_for;
    use crate::models::{AgentConfig, AgentDraft};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_and_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "a1", "name": "Receptionist" },
                { "id": "a2", "name": "Collections" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/agent/a2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "a2",
                "name": "Collections",
                "config": { "prompt": "Be polite", "language": "es-ES" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let agents = client.list_agents().await.unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "Receptionist");

        let agent = client.get_agent("a2").await.unwrap();
        assert_eq!(agent.config.language, "es-ES");
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/agent"))
            .and(body_partial_json(json!({ "name": "Sales" })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "id": "a9", "name": "Sales" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/agent/a9"))
            .and(body_partial_json(json!({ "config": { "prompt": "Close deals" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "a9", "name": "Sales", "config": { "prompt": "Close deals" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/agent/a9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut draft = AgentDraft {
            name: "Sales".to_string(),
            config: AgentConfig::default(),
        };
        let created = client.create_agent(&draft).await.unwrap();
        assert_eq!(created.id, "a9");

        draft.config.prompt = "Close deals".to_string();
        let updated = client.update_agent(&created.id, &draft).await.unwrap();
        assert_eq!(updated.config.prompt, "Close deals");

        client.delete_agent("a9").await.unwrap();
    }
}
