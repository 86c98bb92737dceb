//! Client-side checks run before any request is sent.
//!
//! A failed check becomes a warning toast in the UI and the request is never
//! made.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::{AgentDraft, PhoneImport, ToolDraft, ToolKind};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Config override is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Config override must be a JSON object")]
    NotAnObject,

    #[error("{0} is not a valid phone number; use international format like +14155550100")]
    PhoneFormat(String),

    #[error("{number} does not match country {country} (expected prefix {prefix})")]
    CountryMismatch {
        number: String,
        country: String,
        prefix: &'static str,
    },

    #[error("{field} must be an http(s) URL")]
    InvalidUrl { field: &'static str },

    #[error("Step \"{0}\" cannot be skipped")]
    NotSkippable(&'static str),

    #[error("Balance is below {minimum:.2}; add a valid payment method to continue")]
    PaymentRequired { minimum: f64 },
}

/// Dialling prefixes for the countries offered when importing numbers.
const DIAL_PREFIXES: &[(&str, &str)] = &[
    ("US", "+1"),
    ("CA", "+1"),
    ("GB", "+44"),
    ("IE", "+353"),
    ("AU", "+61"),
    ("NZ", "+64"),
    ("IN", "+91"),
    ("SG", "+65"),
    ("DE", "+49"),
    ("FR", "+33"),
    ("ES", "+34"),
    ("IT", "+39"),
    ("NL", "+31"),
    ("BR", "+55"),
    ("MX", "+52"),
    ("ZA", "+27"),
    ("JP", "+81"),
];

pub fn countries() -> impl Iterator<Item = &'static str> {
    DIAL_PREFIXES.iter().map(|(c, _)| *c)
}

pub fn dial_prefix(country: &str) -> Option<&'static str> {
    DIAL_PREFIXES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(country.trim()))
        .map(|(_, p)| *p)
}

static E164: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").unwrap());

/// Strip common punctuation from a typed number.
pub fn normalize_phone(number: &str) -> String {
    number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

pub fn is_e164(number: &str) -> bool {
    E164.is_match(&normalize_phone(number))
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

pub fn validate_url(field: &'static str, url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Ok(()),
        _ => Err(ValidationError::InvalidUrl { field }),
    }
}

/// Check a number is E.164 and, for known countries, carries that country's
/// prefix. Returns the normalized number.
pub fn validate_phone(number: &str, country: &str) -> Result<String, ValidationError> {
    require("Phone number", number)?;
    let normalized = normalize_phone(number);
    if !E164.is_match(&normalized) {
        return Err(ValidationError::PhoneFormat(number.trim().to_string()));
    }
    if let Some(prefix) = dial_prefix(country) {
        if !normalized.starts_with(prefix) {
            return Err(ValidationError::CountryMismatch {
                number: normalized,
                country: country.trim().to_uppercase(),
                prefix,
            });
        }
    }
    Ok(normalized)
}

/// Parse the free-text override editor. Blank text means no override.
pub fn parse_config_override(text: &str) -> Result<Option<Value>, ValidationError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value: Value =
        serde_json::from_str(text).map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
    if !value.is_object() {
        return Err(ValidationError::NotAnObject);
    }
    Ok(Some(value))
}

pub fn validate_agent(draft: &AgentDraft) -> Result<(), ValidationError> {
    require("Agent name", &draft.name)?;
    require("Language", &draft.config.language)?;
    if let Some(webhook) = &draft.config.webhook {
        validate_url("Webhook URL", &webhook.url)?;
    }
    if let Some(transfer) = &draft.config.call_transfer {
        if !is_e164(&transfer.phone_number) {
            return Err(ValidationError::PhoneFormat(transfer.phone_number.clone()));
        }
    }
    if matches!(&draft.config.config_override, Some(v) if !v.is_object()) {
        return Err(ValidationError::NotAnObject);
    }
    Ok(())
}

pub fn validate_phone_import(request: &PhoneImport) -> Result<(), ValidationError> {
    let (id_label, secret_label) = request.provider.credential_labels();
    require(id_label, &request.credentials.id)?;
    require(secret_label, &request.credentials.secret)?;
    require("Country", &request.country_code)?;
    validate_phone(&request.number, &request.country_code)?;
    Ok(())
}

pub fn validate_tool(draft: &ToolDraft) -> Result<(), ValidationError> {
    require("Tool name", &draft.name)?;
    match &draft.kind {
        ToolKind::Webhook { url, .. } => validate_url("Webhook URL", url),
        ToolKind::App { app, .. } => require("App", app),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentConfig, ProviderCredentials, TelephonyProvider, WebhookSettings};
    use serde_json::json;

    #[test]
    fn test_e164() {
        assert!(is_e164("+14155550100"));
        assert!(is_e164("+44 20 7946 0958"));
        assert!(is_e164("+1 (415) 555-0100"));
        assert!(!is_e164("4155550100"));
        assert!(!is_e164("+0123456789"));
        assert!(!is_e164("+1415"));
        assert!(!is_e164(""));
    }

    #[test]
    fn test_country_prefix_mismatch() {
        assert_eq!(
            validate_phone("+1 415 555 0100", "us").unwrap(),
            "+14155550100"
        );
        let err = validate_phone("+442079460958", "US").unwrap_err();
        assert_eq!(
            err,
            ValidationError::CountryMismatch {
                number: "+442079460958".to_string(),
                country: "US".to_string(),
                prefix: "+1",
            }
        );
        // unknown countries only get the format check
        assert!(validate_phone("+4930123456", "XX").is_ok());
    }

    #[test]
    fn test_config_override() {
        assert_eq!(parse_config_override("  ").unwrap(), None);
        assert_eq!(
            parse_config_override(r#"{"temperature": 0.2}"#).unwrap(),
            Some(json!({ "temperature": 0.2 }))
        );
        assert_eq!(
            parse_config_override("[1, 2]").unwrap_err(),
            ValidationError::NotAnObject
        );
        assert!(matches!(
            parse_config_override("{ nope").unwrap_err(),
            ValidationError::InvalidJson(_)
        ));
    }

    #[test]
    fn test_agent_requires_name_and_valid_webhook() {
        let mut draft = AgentDraft {
            name: " ".to_string(),
            config: AgentConfig::default(),
        };
        assert_eq!(
            validate_agent(&draft).unwrap_err(),
            ValidationError::Required("Agent name")
        );

        draft.name = "Front desk".to_string();
        assert!(validate_agent(&draft).is_ok());

        draft.config.webhook = Some(WebhookSettings {
            url: "ftp://nope".to_string(),
            events: Vec::new(),
        });
        assert_eq!(
            validate_agent(&draft).unwrap_err(),
            ValidationError::InvalidUrl {
                field: "Webhook URL"
            }
        );
    }

    #[test]
    fn test_phone_import_names_missing_credential() {
        let request = PhoneImport {
            number: "+14155550100".to_string(),
            provider: TelephonyProvider::Plivo,
            country_code: "US".to_string(),
            credentials: ProviderCredentials {
                id: "MA123".to_string(),
                secret: String::new(),
            },
            label: None,
        };
        let err = validate_phone_import(&request).unwrap_err();
        assert_eq!(err.to_string(), "Auth Token is required");
    }

    #[test]
    fn test_tool_webhook_url() {
        let draft = ToolDraft {
            name: "lookup".to_string(),
            description: String::new(),
            kind: ToolKind::Webhook {
                url: "https://".to_string(),
                method: Default::default(),
                headers: Default::default(),
            },
        };
        assert!(validate_tool(&draft).is_err());
    }
}
