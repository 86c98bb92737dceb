//! Knowledge-base file endpoints.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use super::{ApiClient, ApiError};
use crate::models::KnowledgeFile;

impl ApiClient {
    pub async fn list_knowledge_files(&self) -> Result<Vec<KnowledgeFile>, ApiError> {
        self.get("/knowledge/list_files").await
    }

    /// Upload a local document as multipart field `file`.
    pub async fn upload_knowledge_file(&self, path: &Path) -> Result<KnowledgeFile, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        tracing::info!(file = %file_name, size = bytes.len(), "Uploading knowledge file");
        let part = Part::bytes(bytes).file_name(file_name);
        let form = Form::new().part("file", part);
        self.post_multipart("/knowledge/upload", form).await
    }

    pub async fn delete_knowledge_file(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/knowledge/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_upload_sends_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/knowledge/upload"))
            .and(header_regex("content-type", "^multipart/form-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "k1", "name": "faq.txt", "size_bytes": 11
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("faq.txt");
        std::fs::File::create(&file_path)
            .unwrap()
            .write_all(b"hello world")
            .unwrap();

        let file = client_for(&server)
            .upload_knowledge_file(&file_path)
            .await
            .unwrap();
        assert_eq!(file.name, "faq.txt");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("filename=\"faq.txt\""));
        assert!(body.contains("hello world"));
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_file_error() {
        let server = MockServer::start().await;
        let err = client_for(&server)
            .upload_knowledge_file(Path::new("/definitely/not/here.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::File { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
