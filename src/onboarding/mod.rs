//! First-run onboarding wizard.
//!
//! Six linear steps collect what the platform needs to provision a working
//! agent: phone connection, voice, billing, industry, agent identity and
//! optional tool integrations. [`OnboardingWizard`] holds the step and the
//! accumulated [`OnboardingData`]; each step's forward guard is a pure
//! function of that data.

mod data;
mod wizard;

pub use data::{
    BillingData, OnboardingConfig, OnboardingData, OnboardingResult, PhoneStepData,
    VoiceChoice, TOOL_APPS,
};
pub use wizard::{check_step, OnboardingStep, OnboardingWizard, WizardTransition};
