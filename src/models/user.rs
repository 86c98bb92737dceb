//! Signed-in account and billing details.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Remaining credit balance in account currency.
    #[serde(default)]
    pub credits: f64,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Whether the account finished the onboarding wizard.
    #[serde(default)]
    pub onboarded: bool,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// A stored card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    #[serde(default)]
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: i32,
}

impl PaymentMethod {
    /// A card is usable through the last day of its expiry month.
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        if self.id.is_empty() || self.last4.len() != 4 || !(1..=12).contains(&self.exp_month) {
            return false;
        }
        (self.exp_year, self.exp_month) >= (today.year(), today.month())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} •••• {} ({:02}/{})",
            self.brand, self.last4, self.exp_month, self.exp_year
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(month: u32, year: i32) -> PaymentMethod {
        PaymentMethod {
            id: "pm_1".to_string(),
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month: month,
            exp_year: year,
        }
    }

    #[test]
    fn test_card_valid_through_expiry_month() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(card(10, 2026).is_valid_on(today));
        assert!(card(1, 2027).is_valid_on(today));
        assert!(!card(9, 2026).is_valid_on(today));
    }

    #[test]
    fn test_malformed_card_invalid() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mut bad = card(13, 2030);
        assert!(!bad.is_valid_on(today));
        bad.exp_month = 5;
        bad.last4 = "42".to_string();
        assert!(!bad.is_valid_on(today));
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User {
            id: "u1".to_string(),
            email: "ops@example.com".to_string(),
            name: None,
            credits: 0.0,
            payment_method: None,
            onboarded: false,
        };
        assert_eq!(user.display_name(), "ops@example.com");
    }
}
