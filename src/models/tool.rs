//! Tools (functions an agent can call) and connected calendars.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// HTTP verb used by a webhook tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// What a tool does when invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolKind {
    /// Calls an arbitrary HTTP endpoint.
    Webhook {
        url: String,
        #[serde(default)]
        method: HttpMethod,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    /// Integration with a third-party app (CRM, helpdesk, ...).
    App {
        app: String,
        #[serde(default)]
        credentials: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: ToolKind,
}

impl Tool {
    pub fn kind_label(&self) -> &str {
        match &self.kind {
            ToolKind::Webhook { .. } => "webhook",
            ToolKind::App { app, .. } => app,
        }
    }

    pub fn app_name(&self) -> Option<&str> {
        match &self.kind {
            ToolKind::App { app, .. } => Some(app),
            ToolKind::Webhook { .. } => None,
        }
    }
}

/// Body of `POST /tools` and `PUT /tools/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDraft {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: ToolKind,
}

impl From<&Tool> for ToolDraft {
    fn from(tool: &Tool) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            kind: tool.kind.clone(),
        }
    }
}

/// A calendar connected for appointment booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_webhook_tool_wire_format() {
        let tool: Tool = serde_json::from_value(json!({
            "id": "t1",
            "name": "lookup_order",
            "type": "webhook",
            "url": "https://shop.example.com/orders",
            "method": "GET"
        }))
        .unwrap();

        assert_eq!(tool.kind_label(), "webhook");
        assert!(matches!(
            tool.kind,
            ToolKind::Webhook { method: HttpMethod::Get, .. }
        ));
        assert!(tool.app_name().is_none());
    }

    #[test]
    fn test_app_tool_wire_format() {
        let tool: Tool = serde_json::from_value(json!({
            "id": "t2",
            "name": "HubSpot",
            "type": "app",
            "app": "hubspot",
            "credentials": { "api_key": "abc" }
        }))
        .unwrap();

        assert_eq!(tool.app_name(), Some("hubspot"));
        let draft = ToolDraft::from(&tool);
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["type"], "app");
        assert_eq!(value["credentials"]["api_key"], "abc");
    }
}
