//! # Policy Configuration
//!
//! Tunable policy values for the checkout flow: exchange rate, invoice
//! lifetime, mock-payment delay and session retention.
//! Loaded from `config/payments.toml` when present, then overridden by
//! environment variables.

use crate::error::PaymentError;
use crate::rate::{ExchangeRate, DEFAULT_BTC_PRICE_EUR};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Upper bound for every seconds-valued setting (one year)
pub const MAX_POLICY_SECS: i64 = 365 * 24 * 60 * 60;

/// Policy values shared by the adapter, store and verification handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Price of one BTC in EUR
    #[serde(default = "default_btc_price_eur")]
    pub btc_price_eur: f64,

    /// Invoice lifetime when the provider does not supply one
    #[serde(default = "default_invoice_expiry_secs")]
    pub invoice_expiry_secs: i64,

    /// Delay after which an unconfirmed session is marked paid by the demo fallback
    #[serde(default = "default_mock_paid_after_secs")]
    pub mock_paid_after_secs: i64,

    /// Whether the demo fallback is active at all
    #[serde(default = "default_true")]
    pub mock_fallback: bool,

    /// How long expired sessions are kept before the sweep removes them
    #[serde(default = "default_retention_secs")]
    pub retention_secs: i64,

    /// Sweep period
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_btc_price_eur() -> f64 {
    DEFAULT_BTC_PRICE_EUR
}

fn default_invoice_expiry_secs() -> i64 {
    15 * 60
}

fn default_mock_paid_after_secs() -> i64 {
    12
}

fn default_true() -> bool {
    true
}

fn default_retention_secs() -> i64 {
    60 * 60
}

fn default_cleanup_interval_secs() -> u64 {
    10 * 60
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            btc_price_eur: default_btc_price_eur(),
            invoice_expiry_secs: default_invoice_expiry_secs(),
            mock_paid_after_secs: default_mock_paid_after_secs(),
            mock_fallback: true,
            retention_secs: default_retention_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl PolicyConfig {
    /// Parse from a TOML string; missing keys take their defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Apply `BTC_PRICE_EUR`, `INVOICE_EXPIRY_SECS`, `MOCK_PAID_AFTER_SECS`
    /// and `MOCK_FALLBACK` overrides. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(price) = env_parse("BTC_PRICE_EUR") {
            self.btc_price_eur = price;
        }
        if let Some(secs) = env_parse("INVOICE_EXPIRY_SECS") {
            self.invoice_expiry_secs = secs;
        }
        if let Some(secs) = env_parse("MOCK_PAID_AFTER_SECS") {
            self.mock_paid_after_secs = secs;
        }
        if let Some(enabled) = env_parse("MOCK_FALLBACK") {
            self.mock_fallback = enabled;
        }
        self
    }

    /// Reject values the store, strategy or sweep cannot work with
    pub fn validate(&self) -> Result<(), PaymentError> {
        if !self.btc_price_eur.is_finite() || self.btc_price_eur <= 0.0 {
            return Err(PaymentError::Configuration(format!(
                "btc_price_eur must be a positive number, got {}",
                self.btc_price_eur
            )));
        }

        let secs = [
            ("invoice_expiry_secs", self.invoice_expiry_secs, 1),
            ("mock_paid_after_secs", self.mock_paid_after_secs, 0),
            ("retention_secs", self.retention_secs, 0),
        ];
        for (name, value, min) in secs {
            if !(min..=MAX_POLICY_SECS).contains(&value) {
                return Err(PaymentError::Configuration(format!(
                    "{} must be between {} and {}, got {}",
                    name, min, MAX_POLICY_SECS, value
                )));
            }
        }

        if self.cleanup_interval_secs == 0 || self.cleanup_interval_secs > MAX_POLICY_SECS as u64 {
            return Err(PaymentError::Configuration(format!(
                "cleanup_interval_secs must be between 1 and {}, got {}",
                MAX_POLICY_SECS, self.cleanup_interval_secs
            )));
        }

        Ok(())
    }

    pub fn exchange_rate(&self) -> ExchangeRate {
        ExchangeRate::new(self.btc_price_eur)
    }

    pub fn invoice_expiry(&self) -> Duration {
        Duration::seconds(self.invoice_expiry_secs)
    }

    pub fn mock_paid_after(&self) -> Duration {
        Duration::seconds(self.mock_paid_after_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::seconds(self.retention_secs)
    }

    pub fn cleanup_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cleanup_interval_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PolicyConfig::default();
        assert_eq!(config.invoice_expiry(), Duration::minutes(15));
        assert_eq!(config.mock_paid_after(), Duration::seconds(12));
        assert_eq!(config.retention(), Duration::hours(1));
        assert_eq!(config.cleanup_interval(), std::time::Duration::from_secs(600));
        assert_eq!(config.exchange_rate().eur_to_sats(1.0), Some(1_000));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = PolicyConfig::from_toml(
            r#"
            btc_price_eur = 50000.0
            mock_fallback = false
            "#,
        )
        .unwrap();

        assert_eq!(config.btc_price_eur, 50_000.0);
        assert!(!config.mock_fallback);
        assert_eq!(config.invoice_expiry_secs, 900);
    }

    #[test]
    fn test_validate() {
        assert!(PolicyConfig::default().validate().is_ok());

        let bad = [
            PolicyConfig {
                btc_price_eur: 0.0,
                ..Default::default()
            },
            PolicyConfig {
                btc_price_eur: f64::NAN,
                ..Default::default()
            },
            PolicyConfig {
                invoice_expiry_secs: 0,
                ..Default::default()
            },
            PolicyConfig {
                invoice_expiry_secs: i64::MAX,
                ..Default::default()
            },
            PolicyConfig {
                mock_paid_after_secs: -1,
                ..Default::default()
            },
            PolicyConfig {
                retention_secs: i64::MAX,
                ..Default::default()
            },
            PolicyConfig {
                cleanup_interval_secs: 0,
                ..Default::default()
            },
        ];
        for config in bad {
            let err = config.validate().unwrap_err();
            assert_eq!(err.code(), "configuration_error", "{:?}", config);
        }
    }
}
