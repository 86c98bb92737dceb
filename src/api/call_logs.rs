//! `/call_logs` endpoints.

use super::{ApiClient, ApiError};
use crate::models::{CallLog, CallLogQuery};

impl ApiClient {
    /// Fetch one page of call history, newest first.
    pub async fn list_call_logs(&self, query: &CallLogQuery) -> Result<Vec<CallLog>, ApiError> {
        self.get_with_query("/call_logs", query).await
    }

    /// Full record including transcript.
    pub async fn get_call_log(&self, id: &str) -> Result<CallLog, ApiError> {
        self.get(&format!("/call_logs/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::client_for;
    use crate::models::CallLogQuery;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_page_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/call_logs"))
            .and(query_param("page", "2"))
            .and(query_param("page_size", "20"))
            .and(query_param("agent_id", "a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "c21", "status": "completed", "duration_secs": 61 }
            ])))
            .mount(&server)
            .await;

        let logs = client_for(&server)
            .list_call_logs(&CallLogQuery {
                page: 2,
                page_size: 20,
                agent_id: Some("a1".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].duration_display(), "1:01");
    }
}
