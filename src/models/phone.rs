//! Phone numbers and telephony providers.

use serde::{Deserialize, Serialize};

/// Telephony carrier a number is connected through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TelephonyProvider {
    #[default]
    Twilio,
    Plivo,
    Telnyx,
    Vonage,
}

impl TelephonyProvider {
    pub fn all() -> &'static [TelephonyProvider] {
        &[
            TelephonyProvider::Twilio,
            TelephonyProvider::Plivo,
            TelephonyProvider::Telnyx,
            TelephonyProvider::Vonage,
        ]
    }

    /// Identifier used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twilio => "twilio",
            Self::Plivo => "plivo",
            Self::Telnyx => "telnyx",
            Self::Vonage => "vonage",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Twilio => "Twilio",
            Self::Plivo => "Plivo",
            Self::Telnyx => "Telnyx",
            Self::Vonage => "Vonage",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(value))
    }

    /// Labels of the two credential fields the provider requires.
    pub fn credential_labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Twilio => ("Account SID", "Auth Token"),
            Self::Plivo => ("Auth ID", "Auth Token"),
            Self::Telnyx | Self::Vonage => ("API Key", "API Secret"),
        }
    }
}

impl std::fmt::Display for TelephonyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider credentials; which pair is meaningful depends on the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderCredentials {
    /// Account SID / Auth ID / API key.
    pub id: String,
    /// Auth token / API secret.
    pub secret: String,
}

impl ProviderCredentials {
    pub fn is_complete(&self) -> bool {
        !self.id.trim().is_empty() && !self.secret.trim().is_empty()
    }
}

/// A number registered with the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub id: String,
    pub number: String,
    #[serde(default)]
    pub provider: TelephonyProvider,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// Agent answering inbound calls on this number.
    #[serde(default)]
    pub agent_id: Option<String>,
}

/// Body of `POST /phones`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneImport {
    pub number: String,
    pub provider: TelephonyProvider,
    pub country_code: String,
    pub credentials: ProviderCredentials,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Body of `PATCH /phones/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PhoneUpdate {
    /// `Some(None)` unassigns the agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}
