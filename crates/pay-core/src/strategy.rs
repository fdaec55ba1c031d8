//! # Payment Strategy Trait
//!
//! Strategy trait for invoice-issuing payment providers.
//! Implementations: Bringin (Lightning Address / LNURL-pay).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentStrategy (trait)                  │
//! │  ├── create_invoice()                                       │
//! │  ├── check_status()                                         │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │BringinStrategy│
//!                    └───────────────┘
//! ```

use crate::error::PaymentResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An invoice issued by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Lightning address the invoice was requested from
    pub address: String,

    /// Amount in EUR
    pub amount_eur: f64,

    /// Amount in satoshis
    pub amount_sats: u64,

    /// Amount in millisatoshis (what was actually requested)
    pub amount_msats: u64,

    /// BOLT11 payment request
    pub payment_request: String,

    /// URL to poll for payment status
    pub verify_url: String,

    pub expires_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

/// Normalized payment status reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    Pending,
    /// Paid, with the provider's settlement time when it reports one
    Paid { paid_at: Option<DateTime<Utc>> },
    Expired,
}

/// Core trait for invoice-issuing payment providers.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Issue an invoice for `amount_eur` payable to `address`.
    async fn create_invoice(&self, amount_eur: f64, address: &str) -> PaymentResult<Invoice>;

    /// Poll the verify URL once.
    ///
    /// Providers should fold transient unreachability into
    /// [`InvoiceStatus::Pending`] and reserve errors for hard failures.
    async fn check_status(&self, verify_url: &str) -> PaymentResult<InvoiceStatus>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;
