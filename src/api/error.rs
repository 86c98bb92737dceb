//! API error type and error-body normalization.
//!
//! The platform reports failures in several shapes:
//! - `{ "detail": "text" }`
//! - `{ "detail": [ "text", { "loc": [...], "msg": "text" } ] }` (validation)
//! - `{ "message": "text" }`
//! - a JSON string or plain-text body
//!
//! All of them collapse into one display string via [`format_error_message`].

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not signed in: set an API token first")]
    Unauthenticated,

    #[error("Could not read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Build a status error from a raw response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            message: format_error_message(status, body),
        }
    }
}

/// Normalize an error response body into one human-readable message.
pub fn format_error_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    let fallback = || format!("Request failed with status {}", status);

    if trimmed.is_empty() {
        return fallback();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => message_from_value(&value).unwrap_or_else(fallback),
        // Not JSON: an HTML error page is useless to show, plain text is fine
        Err(_) if trimmed.starts_with('<') => fallback(),
        Err(_) => trimmed.to_string(),
    }
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => {
            if let Some(detail) = map.get("detail") {
                if let Some(msg) = detail_message(detail) {
                    return Some(msg);
                }
            }
            map.get("message")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        }
        _ => None,
    }
}

fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(detail_item).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        Value::Object(_) => message_from_value(detail).or_else(|| detail_item(detail)),
        _ => None,
    }
}

fn detail_item(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            let msg = map.get("msg").and_then(Value::as_str)?;
            // Last non-"body" segment of loc names the offending field
            let field = map
                .get("loc")
                .and_then(Value::as_array)
                .and_then(|loc| {
                    loc.iter()
                        .rev()
                        .find(|seg| seg.as_str() != Some("body"))
                        .map(|seg| match seg {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                });
            Some(match field {
                Some(field) => format!("{}: {}", field, msg),
                None => msg.to_string(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        assert_eq!(
            format_error_message(400, r#"{"detail": "Agent name already taken"}"#),
            "Agent name already taken"
        );
    }

    #[test]
    fn test_detail_validation_array() {
        let body = r#"{"detail": [
            {"loc": ["body", "name"], "msg": "field required", "type": "missing"},
            {"loc": ["body", "config", "language"], "msg": "invalid language"}
        ]}"#;
        assert_eq!(
            format_error_message(422, body),
            "name: field required; language: invalid language"
        );
    }

    #[test]
    fn test_detail_array_of_strings() {
        assert_eq!(
            format_error_message(400, r#"{"detail": ["first", "second"]}"#),
            "first; second"
        );
    }

    #[test]
    fn test_message_field() {
        assert_eq!(
            format_error_message(500, r#"{"message": "Upstream carrier unavailable"}"#),
            "Upstream carrier unavailable"
        );
    }

    #[test]
    fn test_plain_string_bodies() {
        assert_eq!(format_error_message(403, r#""Forbidden""#), "Forbidden");
        assert_eq!(format_error_message(502, "Bad gateway\n"), "Bad gateway");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(format_error_message(500, ""), "Request failed with status 500");
        assert_eq!(
            format_error_message(404, "<html><body>nope</body></html>"),
            "Request failed with status 404"
        );
        assert_eq!(
            format_error_message(400, r#"{"unrelated": true}"#),
            "Request failed with status 400"
        );
    }

    #[test]
    fn test_display_is_normalized_message() {
        let err = ApiError::from_response(404, r#"{"detail": "Agent not found"}"#);
        assert_eq!(err.to_string(), "Agent not found");
        assert!(err.is_not_found());
    }
}
