//! Text-to-speech voices.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub provider: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    /// Added by the account rather than shipped by the platform.
    #[serde(default)]
    pub custom: bool,
}

impl Voice {
    /// Label shown in voice pickers, e.g. `Rachel (elevenlabs, en-US)`.
    pub fn picker_label(&self) -> String {
        match &self.language {
            Some(lang) => format!("{} ({}, {})", self.name, self.provider, lang),
            None => format!("{} ({})", self.name, self.provider),
        }
    }
}

/// Body of `POST /voice/custom`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomVoiceRequest {
    pub provider: String,
    pub voice_id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_picker_label() {
        let voice: Voice = serde_json::from_value(json!({
            "id": "v1",
            "name": "Rachel",
            "provider": "elevenlabs",
            "language": "en-US"
        }))
        .unwrap();
        assert_eq!(voice.picker_label(), "Rachel (elevenlabs, en-US)");
        assert!(!voice.custom);
    }
}
