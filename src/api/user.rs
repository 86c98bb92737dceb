//! Current-account endpoint.

use super::{ApiClient, ApiError};
use crate::models::User;

impl ApiClient {
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/user/me").await
    }

    /// Fetch the account and store it on the session.
    pub async fn refresh_current_user(&self) -> Result<User, ApiError> {
        let user = self.current_user().await?;
        self.session().set_current_user(Some(user.clone()));
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::client_for;
    use crate::session::SessionProvider;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_refresh_populates_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1", "email": "ops@example.com", "credits": 3.5
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.session().current_user().is_none());
        client.refresh_current_user().await.unwrap();
        let user = client.session().current_user().unwrap();
        assert_eq!(user.credits, 3.5);
        assert!(!user.onboarded);
    }
}
