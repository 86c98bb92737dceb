//! Voice agent definitions.
//!
//! Every optional block of [`AgentConfig`] is an `Option`: a present block
//! switches the corresponding feature on for the agent, an absent block keeps
//! it off. The console never interprets the blocks beyond editing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A configured voice-conversation persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub config: AgentConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /agent` and `PUT /agent/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AgentDraft {
    pub name: String,
    pub config: AgentConfig,
}

impl From<&Agent> for AgentDraft {
    fn from(agent: &Agent) -> Self {
        Self {
            name: agent.name.clone(),
            config: agent.config.clone(),
        }
    }
}

/// Full agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// System prompt.
    pub prompt: String,
    /// First sentence spoken when a call connects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_message: Option<String>,
    /// BCP-47 language tag, e.g. `en-US`.
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcriber: Option<TranscriberSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<CalendarSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_transfer: Option<CallTransferSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_call: Option<EndCallSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voicemail: Option<VoicemailSettings>,
    /// Ids of tools the agent may invoke.
    pub tool_ids: Vec<String>,
    /// Ids of knowledge files the agent may reference.
    pub knowledge_file_ids: Vec<String>,
    /// Raw JSON merged over the config server-side. Must be an object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_override: Option<serde_json::Value>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            first_message: None,
            language: "en-US".to_string(),
            voice: None,
            llm: None,
            transcriber: None,
            webhook: None,
            calendar: None,
            call_transfer: None,
            end_call: None,
            voicemail: None,
            tool_ids: Vec::new(),
            knowledge_file_ids: Vec::new(),
            config_override: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub provider: String,
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriberSettings {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Post-call webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookSettings {
    pub url: String,
    #[serde(default)]
    pub events: Vec<String>,
}

/// Appointment booking against a connected calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSettings {
    pub calendar_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTransferSettings {
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndCallSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silence_timeout_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goodbye_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicemailSettings {
    pub message: String,
    #[serde(default)]
    pub hang_up_after: bool,
}

impl AgentConfig {
    /// Names of the optional feature blocks that are switched on.
    pub fn enabled_features(&self) -> Vec<&'static str> {
        let mut features = Vec::new();
        if self.webhook.is_some() {
            features.push("webhook");
        }
        if self.calendar.is_some() {
            features.push("calendar");
        }
        if self.call_transfer.is_some() {
            features.push("transfer");
        }
        if self.end_call.is_some() {
            features.push("end-call");
        }
        if self.voicemail.is_some() {
            features.push("voicemail");
        }
        if self.config_override.is_some() {
            features.push("override");
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_agent_deserializes_with_defaults() {
        let agent: Agent = serde_json::from_value(json!({
            "id": "ag_1",
            "name": "Receptionist"
        }))
        .unwrap();

        assert_eq!(agent.config.language, "en-US");
        assert!(agent.config.voice.is_none());
        assert!(agent.config.tool_ids.is_empty());
        assert!(agent.config.enabled_features().is_empty());
    }

    #[test]
    fn test_absent_blocks_are_not_serialized() {
        let draft = AgentDraft {
            name: "Sales".to_string(),
            config: AgentConfig {
                prompt: "Be helpful".to_string(),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&draft).unwrap();
        let config = value.get("config").unwrap();
        assert!(config.get("webhook").is_none());
        assert!(config.get("voicemail").is_none());
        assert_eq!(config["prompt"], "Be helpful");
    }

    #[test]
    fn test_present_block_enables_feature() {
        let agent: Agent = serde_json::from_value(json!({
            "id": "ag_2",
            "name": "Support",
            "config": {
                "prompt": "hi",
                "language": "de-DE",
                "webhook": { "url": "https://hooks.example.com/call" },
                "voicemail": { "message": "Please call back" }
            }
        }))
        .unwrap();

        assert_eq!(agent.config.enabled_features(), vec!["webhook", "voicemail"]);
        assert_eq!(
            agent.config.webhook.as_ref().map(|w| w.url.as_str()),
            Some("https://hooks.example.com/call")
        );
        assert!(!agent.config.voicemail.as_ref().unwrap().hang_up_after);
    }
}
