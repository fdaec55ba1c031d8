//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the session store, payment strategy, settlement client and
//! the verification handler built over them.

use crate::settlement::HttpSettlementClient;
use pay_bringin::{BringinConfig, BringinStrategy};
use pay_core::{
    BoxedPaymentStrategy, BoxedSettlementApi, PolicyConfig, SessionStore, SharedClock,
    StoreSettings, SystemClock, VerificationHandler,
};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Base URL of the settlement API
    pub settlement_api_url: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            settlement_api_url: std::env::var("SETTLEMENT_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Payment policy
    pub policy: PolicyConfig,
    /// Lightning address used when a checkout does not carry one
    pub default_address: String,
    /// In-flight checkout sessions
    pub store: Arc<SessionStore>,
    /// Invoice provider
    pub strategy: BoxedPaymentStrategy,
    /// Checkout backend of record
    pub settlement: BoxedSettlementApi,
    /// Status polling state machine
    pub verifier: Arc<VerificationHandler>,
}

impl AppState {
    /// Create a new AppState with the Bringin strategy and HTTP settlement client
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let policy = load_policy()?;

        let bringin_config = BringinConfig::from_env(&policy)
            .map_err(|e| anyhow::anyhow!("Failed to configure Bringin: {}", e))?;
        let default_address = bringin_config.lightning_address.clone();
        let strategy = BringinStrategy::new(bringin_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Bringin: {}", e))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        let settlement = HttpSettlementClient::new(http, &config.settlement_api_url);

        Ok(Self::with_components(
            config,
            policy,
            default_address,
            Arc::new(SystemClock),
            Arc::new(strategy),
            Arc::new(settlement),
        ))
    }

    /// Wire state from explicit parts
    pub fn with_components(
        config: AppConfig,
        policy: PolicyConfig,
        default_address: impl Into<String>,
        clock: SharedClock,
        strategy: BoxedPaymentStrategy,
        settlement: BoxedSettlementApi,
    ) -> Self {
        let store = Arc::new(SessionStore::with_settings(
            clock,
            StoreSettings::from(&policy),
        ));
        let verifier = Arc::new(
            VerificationHandler::new(store.clone(), strategy.clone(), settlement.clone())
                .with_mock_fallback(policy.mock_fallback),
        );

        Self {
            config,
            policy,
            default_address: default_address.into(),
            store,
            strategy,
            settlement,
            verifier,
        }
    }
}

/// Load payment policy from config file, then apply env overrides
fn load_policy() -> anyhow::Result<PolicyConfig> {
    let config_paths = [
        "config/payments.toml",
        "../config/payments.toml",
        "../../config/payments.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let policy = PolicyConfig::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded payment policy from {}", path);
            return checked_policy(policy.with_env_overrides());
        }
    }

    tracing::warn!("No payment policy found, using defaults");
    checked_policy(PolicyConfig::default().with_env_overrides())
}

fn checked_policy(policy: PolicyConfig) -> anyhow::Result<PolicyConfig> {
    policy
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid payment policy: {}", e))?;
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            environment: "test".to_string(),
            settlement_api_url: "http://localhost:4000".to_string(),
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_socket_addr_invalid_host() {
        let config = AppConfig {
            host: "not a host".to_string(),
            ..test_config()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_checked_policy_rejects_zero_sweep_interval() {
        let policy = PolicyConfig {
            cleanup_interval_secs: 0,
            ..Default::default()
        };
        let err = checked_policy(policy).unwrap_err();
        assert!(err.to_string().contains("cleanup_interval_secs"));

        assert!(checked_policy(PolicyConfig::default()).is_ok());
    }

    #[test]
    fn test_is_production() {
        assert!(!test_config().is_production());
        let config = AppConfig {
            environment: "production".to_string(),
            ..test_config()
        };
        assert!(config.is_production());
    }
}
