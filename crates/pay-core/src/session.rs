//! # Session Types
//!
//! Checkout session records tracked while a Lightning invoice is outstanding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a checkout session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Invoice issued, awaiting payment
    Pending,
    /// Payment confirmed (by the provider or the demo fallback)
    Paid,
    /// Invoice expired before payment
    Expired,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Pending
    }
}

/// One in-flight checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    /// Checkout identifier (shared with the settlement API)
    pub checkout_id: String,

    /// Lightning address the invoice was requested from
    pub address: String,

    /// Amount in EUR
    pub amount_eur: f64,

    /// Amount in satoshis
    pub amount_sats: u64,

    /// BOLT11 payment request
    pub invoice: String,

    /// URL polled to learn the payment status
    pub verify_url: String,

    /// Provider payment reference, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    #[serde(default)]
    pub status: SessionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for [`crate::SessionStore::create_session`]
#[derive(Debug, Clone)]
pub struct NewSession {
    pub checkout_id: String,
    pub address: String,
    pub amount_eur: f64,
    pub amount_sats: u64,
    pub invoice: String,
    pub verify_url: String,
    pub payment_reference: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl NewSession {
    /// Build from an issued invoice
    pub fn from_invoice(checkout_id: impl Into<String>, invoice: &crate::Invoice) -> Self {
        Self {
            checkout_id: checkout_id.into(),
            address: invoice.address.clone(),
            amount_eur: invoice.amount_eur,
            amount_sats: invoice.amount_sats,
            invoice: invoice.payment_request.clone(),
            verify_url: invoice.verify_url.clone(),
            payment_reference: invoice.payment_reference.clone(),
            expires_at: invoice.expires_at,
        }
    }
}
