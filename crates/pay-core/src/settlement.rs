//! # Settlement API
//!
//! The checkout service of record lives in a separate backend. This module
//! defines the operations the payment engine consumes from it; the HTTP
//! client lives in `pay-api`.

use crate::error::PaymentResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A checkout as known to the settlement API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub id: String,

    /// Amount due in EUR
    pub amount: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Settlement-side status string (opaque to this engine)
    #[serde(default)]
    pub status: String,

    /// Lightning address chosen for this checkout, if the backend stores one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightning_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<String>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// Body for creating a checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckout {
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Invoice details registered against a checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRegistration {
    pub invoice: String,
    pub amount_sats: u64,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

/// Payment notification sent once a checkout is paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceived {
    pub amount_sats: u64,
    pub paid_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

/// Operations consumed from the settlement backend
#[async_trait]
pub trait SettlementApi: Send + Sync {
    async fn create(&self, request: &CreateCheckout) -> PaymentResult<Checkout>;

    async fn get(&self, checkout_id: &str) -> PaymentResult<Checkout>;

    async fn confirm(&self, checkout_id: &str) -> PaymentResult<Checkout>;

    async fn register_invoice(
        &self,
        checkout_id: &str,
        registration: &InvoiceRegistration,
    ) -> PaymentResult<()>;

    async fn payment_received(
        &self,
        checkout_id: &str,
        payment: &PaymentReceived,
    ) -> PaymentResult<()>;
}

pub type BoxedSettlementApi = Arc<dyn SettlementApi>;
