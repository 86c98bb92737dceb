//! Data gathered by the wizard and the payload sent on completion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PaymentMethod, PhoneImport, ProviderCredentials, TelephonyProvider};

/// App integrations offered on the last step: `(app id, display name)`.
pub const TOOL_APPS: &[(&str, &str)] = &[
    ("google_calendar", "Google Calendar"),
    ("calendly", "Calendly"),
    ("hubspot", "HubSpot"),
    ("salesforce", "Salesforce"),
    ("zendesk", "Zendesk"),
    ("slack", "Slack"),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneStepData {
    pub provider: TelephonyProvider,
    pub credentials: ProviderCredentials,
    pub number: String,
    pub country_code: String,
}

impl PhoneStepData {
    pub fn to_import(&self) -> PhoneImport {
        PhoneImport {
            number: crate::validation::normalize_phone(&self.number),
            provider: self.provider,
            country_code: self.country_code.trim().to_uppercase(),
            credentials: self.credentials.clone(),
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceChoice {
    pub provider: String,
    pub voice_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillingData {
    pub balance: f64,
    pub minimum_balance: f64,
    pub payment_method: Option<PaymentMethod>,
    /// Date card expiry is judged against.
    pub today: NaiveDate,
}

impl BillingData {
    pub fn is_satisfied(&self) -> bool {
        self.balance >= self.minimum_balance
            || self
                .payment_method
                .as_ref()
                .is_some_and(|pm| pm.is_valid_on(self.today))
    }
}

/// Everything entered so far. Survives moving back and forth.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingData {
    pub phone: PhoneStepData,
    pub phone_skipped: bool,
    pub voice: Option<VoiceChoice>,
    pub billing: BillingData,
    pub industry: String,
    pub agent_name: String,
    pub language: String,
    pub tool_apps: Vec<String>,
}

impl OnboardingData {
    pub fn new(billing: BillingData) -> Self {
        Self {
            phone: PhoneStepData {
                country_code: "US".to_string(),
                ..Default::default()
            },
            phone_skipped: false,
            voice: None,
            billing,
            industry: String::new(),
            agent_name: String::new(),
            language: "en-US".to_string(),
            tool_apps: Vec::new(),
        }
    }
}

/// Body of `POST /onboarding`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneImport>,
    pub voice: VoiceChoice,
    pub industry: String,
    pub agent_name: String,
    pub language: String,
    pub tools: Vec<String>,
}

/// What the platform provisioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OnboardingResult {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub phone_id: Option<String>,
}
