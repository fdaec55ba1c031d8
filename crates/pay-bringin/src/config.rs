//! # Bringin Configuration
//!
//! Configuration for the Bringin Lightning Address integration.
//! The receiving address is loaded from environment variables.

use crate::address::LightningAddress;
use chrono::Duration;
use pay_core::{ExchangeRate, PaymentError, PolicyConfig};
use std::env;

/// Bringin integration configuration
#[derive(Debug, Clone)]
pub struct BringinConfig {
    /// Default receiving Lightning Address (e.g. `shop@bringin.xyz`)
    pub lightning_address: String,

    /// URL scheme for discovery and derived verify URLs
    pub scheme: String,

    /// HTTP timeout for every provider request
    pub timeout_secs: u64,

    /// EUR/BTC conversion
    pub rate: ExchangeRate,

    /// Invoice lifetime when the provider does not report one
    pub invoice_expiry: Duration,
}

impl BringinConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `BRINGIN_LIGHTNING_ADDRESS`
    ///
    /// Optional:
    /// - `BRINGIN_URL_SCHEME` (`https` or `http`, default `https`)
    /// - `BRINGIN_HTTP_TIMEOUT_SECS` (default 30)
    pub fn from_env(policy: &PolicyConfig) -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();

        let lightning_address = env::var("BRINGIN_LIGHTNING_ADDRESS").map_err(|_| {
            PaymentError::Configuration("BRINGIN_LIGHTNING_ADDRESS not set".to_string())
        })?;

        LightningAddress::parse(&lightning_address).map_err(|_| {
            PaymentError::Configuration(
                "BRINGIN_LIGHTNING_ADDRESS must look like user@domain".to_string(),
            )
        })?;

        let scheme = env::var("BRINGIN_URL_SCHEME").unwrap_or_else(|_| "https".to_string());
        if scheme != "https" && scheme != "http" {
            return Err(PaymentError::Configuration(
                "BRINGIN_URL_SCHEME must be https or http".to_string(),
            ));
        }

        let timeout_secs = env::var("BRINGIN_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let mut config = Self::new(lightning_address)
            .with_scheme(scheme)
            .with_policy(policy);
        config.timeout_secs = timeout_secs;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(lightning_address: impl Into<String>) -> Self {
        let policy = PolicyConfig::default();
        Self {
            lightning_address: lightning_address.into(),
            scheme: "https".to_string(),
            timeout_secs: 30,
            rate: policy.exchange_rate(),
            invoice_expiry: policy.invoice_expiry(),
        }
    }

    /// Builder: set URL scheme (plain `http` for local providers)
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Builder: take rate and expiry from a policy
    pub fn with_policy(mut self, policy: &PolicyConfig) -> Self {
        self.rate = policy.exchange_rate();
        self.invoice_expiry = policy.invoice_expiry();
        self
    }
}
