//! Step machine for the onboarding flow.

use crate::models::TelephonyProvider;
use crate::validation::{self, ValidationError};

use super::data::{OnboardingConfig, OnboardingData, VoiceChoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum OnboardingStep {
    #[default]
    PhoneConnection,
    VoiceProvider,
    Billing,
    Industry,
    AgentIdentity,
    Tools,
}

impl OnboardingStep {
    pub fn all() -> &'static [OnboardingStep] {
        &[
            OnboardingStep::PhoneConnection,
            OnboardingStep::VoiceProvider,
            OnboardingStep::Billing,
            OnboardingStep::Industry,
            OnboardingStep::AgentIdentity,
            OnboardingStep::Tools,
        ]
    }

    /// 1-based position.
    pub fn number(&self) -> usize {
        Self::all().iter().position(|s| s == self).unwrap_or(0) + 1
    }

    pub fn count() -> usize {
        Self::all().len()
    }

    pub fn title(&self) -> &'static str {
        match self {
            OnboardingStep::PhoneConnection => "Connect a phone number",
            OnboardingStep::VoiceProvider => "Choose a voice",
            OnboardingStep::Billing => "Billing",
            OnboardingStep::Industry => "Your industry",
            OnboardingStep::AgentIdentity => "Name your agent",
            OnboardingStep::Tools => "Connect tools",
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::all().get(self.number()).copied()
    }

    pub fn prev(&self) -> Option<Self> {
        self.number()
            .checked_sub(2)
            .and_then(|i| Self::all().get(i).copied())
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// Steps that may be passed over without validation.
    pub fn can_skip(&self) -> bool {
        matches!(self, OnboardingStep::PhoneConnection | OnboardingStep::Tools)
    }
}

/// Forward guard for a step.
pub fn check_step(step: OnboardingStep, data: &OnboardingData) -> Result<(), ValidationError> {
    match step {
        OnboardingStep::PhoneConnection => {
            let (id_label, secret_label) = data.phone.provider.credential_labels();
            validation::require(id_label, &data.phone.credentials.id)?;
            validation::require(secret_label, &data.phone.credentials.secret)?;
            validation::validate_phone(&data.phone.number, &data.phone.country_code)?;
            Ok(())
        }
        OnboardingStep::VoiceProvider => match &data.voice {
            Some(v) if !v.voice_id.is_empty() => Ok(()),
            _ => Err(ValidationError::Required("Voice")),
        },
        OnboardingStep::Billing => {
            if data.billing.is_satisfied() {
                Ok(())
            } else {
                Err(ValidationError::PaymentRequired {
                    minimum: data.billing.minimum_balance,
                })
            }
        }
        OnboardingStep::Industry => validation::require("Industry", &data.industry),
        OnboardingStep::AgentIdentity => {
            validation::require("Agent name", &data.agent_name)?;
            validation::require("Language", &data.language)
        }
        OnboardingStep::Tools => Ok(()),
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardTransition {
    Moved(OnboardingStep),
    /// Back from the first step leaves the flow.
    Exit,
    /// The guard refused; the step stays put.
    Blocked(ValidationError),
    /// Finished; submit this.
    Complete(OnboardingConfig),
}

#[derive(Debug, Clone)]
pub struct OnboardingWizard {
    step: OnboardingStep,
    pub data: OnboardingData,
}

impl OnboardingWizard {
    pub fn new(data: OnboardingData) -> Self {
        Self {
            step: OnboardingStep::default(),
            data,
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn can_advance(&self) -> bool {
        check_step(self.step, &self.data).is_ok()
    }

    /// Change the phone provider. Credentials belong to one provider, so
    /// they are cleared.
    pub fn set_provider(&mut self, provider: TelephonyProvider) {
        if self.data.phone.provider != provider {
            self.data.phone.provider = provider;
            self.data.phone.credentials = Default::default();
        }
    }

    pub fn next(&mut self) -> WizardTransition {
        if let Err(e) = check_step(self.step, &self.data) {
            return WizardTransition::Blocked(e);
        }
        if self.step == OnboardingStep::PhoneConnection {
            self.data.phone_skipped = false;
        }
        self.advance()
    }

    pub fn back(&mut self) -> WizardTransition {
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                WizardTransition::Moved(prev)
            }
            None => WizardTransition::Exit,
        }
    }

    pub fn skip(&mut self) -> WizardTransition {
        match self.step {
            OnboardingStep::PhoneConnection => self.data.phone_skipped = true,
            OnboardingStep::Tools => self.data.tool_apps.clear(),
            step => {
                return WizardTransition::Blocked(ValidationError::NotSkippable(step.title()));
            }
        }
        self.advance()
    }

    fn advance(&mut self) -> WizardTransition {
        match self.step.next() {
            Some(next) => {
                tracing::debug!(step = next.number(), "Onboarding step");
                self.step = next;
                WizardTransition::Moved(next)
            }
            None => match self.config() {
                Some(config) => WizardTransition::Complete(config),
                None => WizardTransition::Blocked(ValidationError::Required("Voice")),
            },
        }
    }

    /// Assemble the completion payload. `None` until a voice is chosen.
    pub fn config(&self) -> Option<OnboardingConfig> {
        let voice: VoiceChoice = self.data.voice.clone()?;
        let phone = (!self.data.phone_skipped).then(|| self.data.phone.to_import());
        Some(OnboardingConfig {
            phone,
            voice,
            industry: self.data.industry.trim().to_string(),
            agent_name: self.data.agent_name.trim().to_string(),
            language: self.data.language.clone(),
            tools: self.data.tool_apps.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use crate::onboarding::data::BillingData;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn wizard(balance: f64) -> OnboardingWizard {
        OnboardingWizard::new(OnboardingData::new(BillingData {
            balance,
            minimum_balance: 5.0,
            payment_method: None,
            today: today(),
        }))
    }

    fn fill_voice_through_identity(w: &mut OnboardingWizard) {
        w.data.voice = Some(VoiceChoice {
            provider: "elevenlabs".to_string(),
            voice_id: "rachel".to_string(),
        });
        assert_eq!(w.next(), WizardTransition::Moved(OnboardingStep::Billing));
        assert_eq!(w.next(), WizardTransition::Moved(OnboardingStep::Industry));
        w.data.industry = "Dental".to_string();
        assert_eq!(w.next(), WizardTransition::Moved(OnboardingStep::AgentIdentity));
        w.data.agent_name = "Front desk".to_string();
        assert_eq!(w.next(), WizardTransition::Moved(OnboardingStep::Tools));
    }

    #[test]
    fn test_step_numbering() {
        assert_eq!(OnboardingStep::PhoneConnection.number(), 1);
        assert_eq!(OnboardingStep::Tools.number(), 6);
        assert_eq!(OnboardingStep::count(), 6);
        assert_eq!(OnboardingStep::PhoneConnection.prev(), None);
        assert_eq!(
            OnboardingStep::Billing.prev(),
            Some(OnboardingStep::VoiceProvider)
        );
        assert!(OnboardingStep::Tools.is_last());
    }

    #[test]
    fn test_plivo_credentials_gate_next() {
        let mut w = wizard(10.0);
        w.set_provider(TelephonyProvider::Plivo);
        assert!(!w.can_advance());
        assert!(matches!(
            w.next(),
            WizardTransition::Blocked(ValidationError::Required("Auth ID"))
        ));
        assert_eq!(w.step(), OnboardingStep::PhoneConnection);

        w.data.phone.credentials.id = "MAXXXXXXXX".to_string();
        w.data.phone.credentials.secret = "secret".to_string();
        assert!(!w.can_advance());

        w.data.phone.number = "+14155550100".to_string();
        assert!(w.can_advance());
        assert_eq!(
            w.next(),
            WizardTransition::Moved(OnboardingStep::VoiceProvider)
        );
    }

    #[test]
    fn test_back_from_first_exits_and_data_persists() {
        let mut w = wizard(10.0);
        assert_eq!(w.back(), WizardTransition::Exit);

        w.skip();
        assert_eq!(w.step(), OnboardingStep::VoiceProvider);
        w.data.voice = Some(VoiceChoice {
            provider: "azure".to_string(),
            voice_id: "jenny".to_string(),
        });
        w.next();
        assert_eq!(w.back(), WizardTransition::Moved(OnboardingStep::VoiceProvider));
        assert_eq!(w.data.voice.as_ref().unwrap().voice_id, "jenny");
    }

    #[test]
    fn test_skip_only_on_allowed_steps() {
        let mut w = wizard(10.0);
        w.skip();
        assert!(w.data.phone_skipped);
        assert!(matches!(w.skip(), WizardTransition::Blocked(_)));
        assert_eq!(w.step(), OnboardingStep::VoiceProvider);
    }

    #[test]
    fn test_blocked_transition_keeps_its_reason() {
        let mut w = wizard(10.0);
        w.skip();
        let blocked = w.skip();
        let shown = blocked.clone();
        assert_eq!(blocked, shown);
        match shown {
            WizardTransition::Blocked(reason) => {
                assert_eq!(reason, ValidationError::NotSkippable("Choose a voice"));
            }
            other => panic!("expected Blocked, got {:?}", other),
        }
    }

    #[test]
    fn test_billing_needs_balance_or_valid_card() {
        let mut w = wizard(1.0);
        w.skip();
        w.data.voice = Some(VoiceChoice {
            provider: "p".to_string(),
            voice_id: "v".to_string(),
        });
        w.next();
        assert!(matches!(
            w.next(),
            WizardTransition::Blocked(ValidationError::PaymentRequired { .. })
        ));

        w.data.billing.payment_method = Some(PaymentMethod {
            id: "pm_1".to_string(),
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month: 1,
            exp_year: 2026,
        });
        assert!(!w.can_advance());

        w.data.billing.payment_method.as_mut().unwrap().exp_year = 2028;
        assert!(w.can_advance());
    }

    #[test]
    fn test_completion_payload() {
        let mut w = wizard(10.0);
        w.data.phone.credentials.id = "AC1".to_string();
        w.data.phone.credentials.secret = "tok".to_string();
        w.data.phone.number = "+1 415 555 0100".to_string();
        w.next();
        fill_voice_through_identity(&mut w);

        w.data.tool_apps = vec!["hubspot".to_string()];
        match w.next() {
            WizardTransition::Complete(config) => {
                let phone = config.phone.unwrap();
                assert_eq!(phone.number, "+14155550100");
                assert_eq!(phone.provider, TelephonyProvider::Twilio);
                assert_eq!(config.agent_name, "Front desk");
                assert_eq!(config.tools, vec!["hubspot"]);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_skipping_phone_and_tools() {
        let mut w = wizard(10.0);
        w.skip();
        fill_voice_through_identity(&mut w);
        w.data.tool_apps = vec!["slack".to_string()];

        match w.skip() {
            WizardTransition::Complete(config) => {
                assert!(config.phone.is_none());
                assert!(config.tools.is_empty());
                let json = serde_json::to_value(&config).unwrap();
                assert!(json.get("phone").is_none());
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }
}
