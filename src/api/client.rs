//! Configured HTTP client for the platform API.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::ApiError;
use crate::config::Config;
use crate::session::SessionProvider;

/// Called with every failed request before the error is returned.
pub type ErrorHook = Arc<dyn Fn(&ApiError) + Send + Sync>;

/// Thin JSON client: base URL, default headers, bearer auth, timeout and a
/// response-error interceptor. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
    on_error: Option<ErrorHook>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.session.is_authenticated())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<dyn SessionProvider>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // request-level content types (multipart) take precedence
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("voxdesk/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            on_error: None,
        })
    }

    /// Install the error interceptor (the TUI turns errors into toasts).
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.session.access_token().ok_or(ApiError::Unauthenticated)?;
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Unauthenticated)?;
        auth.set_sensitive(true);
        Ok(self.http.request(method, self.url(path)).header(AUTHORIZATION, auth))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path);
        self.execute(Method::GET, path, builder).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).map(|b| b.query(query));
        self.execute(Method::GET, path, builder).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).map(|b| b.json(body));
        self.execute(Method::POST, path, builder).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path).map(|b| b.json(body));
        self.execute(Method::PUT, path, builder).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PATCH, path).map(|b| b.json(body));
        self.execute(Method::PATCH, path, builder).await
    }

    /// DELETE a resource; whatever the server returns is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, path);
        self.execute::<IgnoredAny>(Method::DELETE, path, builder)
            .await
            .map(|_| ())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, path).map(|b| b.multipart(form));
        self.execute(Method::POST, path, builder).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: Result<RequestBuilder, ApiError>,
    ) -> Result<T, ApiError> {
        debug!(%method, path, "API request");
        let result = match builder {
            Ok(builder) => Self::send(builder).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!(%method, path, status = ?e.status(), error = %e, "API request failed");
            if let Some(hook) = &self.on_error {
                hook(e);
            }
        }
        result
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        // 204 and empty bodies decode as JSON null
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use crate::session::Session;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_attaches_bearer_and_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let value: Value = client_for(&server).get("/ping").await.unwrap();
        assert_eq!(value, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_query_and_body_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/items/7"))
            .and(body_json(json!({ "label": "x" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let items: Vec<Value> = client
            .get_with_query("items", &[("page", 3)])
            .await
            .unwrap();
        assert!(items.is_empty());

        let patched: Value = client.patch("items/7", &json!({ "label": "x" })).await.unwrap();
        assert_eq!(patched["id"], 7);
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/agent/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": true })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/agent/a2"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.delete("/agent/a1").await.unwrap();
        client.delete("/agent/a2").await.unwrap();
    }

    #[tokio::test]
    async fn test_error_is_normalized_and_hook_fires() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/agent"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({ "detail": [{ "loc": ["body", "name"], "msg": "field required" }] })),
            )
            .mount(&server)
            .await;

        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();
        let client = client_for(&server)
            .with_error_hook(Arc::new(move |e: &ApiError| sink.lock().push(e.to_string())));

        let err = client
            .post::<_, Value>("/agent", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "name: field required");
        assert_eq!(*seen.lock(), vec!["name: field required".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        let server = MockServer::start().await;
        let config = Config {
            api_url: server.uri(),
            ..Default::default()
        };
        let client = ApiClient::new(&config, Session::new(None)).unwrap();

        let err = client.get::<Value>("/agent").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
