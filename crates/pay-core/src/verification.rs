//! # Verification Handler
//!
//! Drives one step of the externally polled checkout state machine:
//!
//! ```text
//! check_status(id)
//!   ├── unknown id            → session_not_found
//!   ├── already paid/expired  → cached result, no I/O
//!   ├── past expires_at       → expired
//!   └── poll provider
//!         ├── paid            → paid (+ notify settlement)
//!         ├── expired         → expired
//!         └── pending / error → demo fallback after delay, else pending
//! ```
//!
//! Calls for the same checkout are serialized so overlapping polls cannot
//! both synthesize a payment and notify the settlement API twice.

use crate::error::{PaymentError, PaymentResult};
use crate::session::{CheckoutSession, SessionStatus};
use crate::settlement::{BoxedSettlementApi, PaymentReceived};
use crate::store::SessionStore;
use crate::strategy::{BoxedPaymentStrategy, InvoiceStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of a status check, as returned to polling clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatusOutcome {
    Pending,
    Paid {
        #[serde(rename = "paidAt")]
        paid_at: DateTime<Utc>,
        /// Amount in satoshis
        #[serde(rename = "amountReceived")]
        amount_received: u64,
    },
    Expired,
}

/// Orchestrates status checks against the store, provider and settlement API
pub struct VerificationHandler {
    store: Arc<SessionStore>,
    strategy: BoxedPaymentStrategy,
    settlement: BoxedSettlementApi,
    mock_fallback: bool,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl VerificationHandler {
    pub fn new(
        store: Arc<SessionStore>,
        strategy: BoxedPaymentStrategy,
        settlement: BoxedSettlementApi,
    ) -> Self {
        Self {
            store,
            strategy,
            settlement,
            mock_fallback: true,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Enable or disable the demo fallback
    pub fn with_mock_fallback(mut self, enabled: bool) -> Self {
        self.mock_fallback = enabled;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Advance the state machine for `checkout_id` by one step.
    #[instrument(skip(self))]
    pub async fn check_status(&self, checkout_id: &str) -> PaymentResult<CheckStatusOutcome> {
        // Declared before the guard so it drops last, also when the call is cancelled
        let _lease = LockLease {
            handler: self,
            checkout_id,
        };
        let _guard = self.lock_for(checkout_id).lock_owned().await;
        self.step(checkout_id).await
    }

    async fn step(&self, checkout_id: &str) -> PaymentResult<CheckStatusOutcome> {
        let session = self
            .store
            .get_session(checkout_id)
            .ok_or_else(|| PaymentError::SessionNotFound {
                session_id: checkout_id.to_string(),
            })?;

        match session.status {
            SessionStatus::Paid => {
                debug!("Returning cached paid status");
                return Ok(CheckStatusOutcome::Paid {
                    paid_at: session.paid_at.unwrap_or_else(|| self.store.now()),
                    amount_received: session.amount_sats,
                });
            }
            SessionStatus::Expired => return Ok(CheckStatusOutcome::Expired),
            SessionStatus::Pending => {}
        }

        if self.store.is_session_expired(&session) {
            info!("Checkout session expired locally");
            self.store
                .update_session_status(checkout_id, SessionStatus::Expired, None);
            return Ok(CheckStatusOutcome::Expired);
        }

        match self.strategy.check_status(&session.verify_url).await {
            Ok(InvoiceStatus::Paid { paid_at }) => {
                let paid_at = paid_at.unwrap_or_else(|| self.store.now());
                info!(provider = self.strategy.provider_name(), "Payment confirmed by provider");
                Ok(self.mark_paid(&session, paid_at).await)
            }
            Ok(InvoiceStatus::Expired) => {
                info!("Provider reports invoice expired");
                self.store
                    .update_session_status(checkout_id, SessionStatus::Expired, None);
                Ok(CheckStatusOutcome::Expired)
            }
            Ok(InvoiceStatus::Pending) => self.pending_or_mock(&session).await,
            Err(e) => {
                warn!("Status poll failed, treating as pending: {}", e);
                self.pending_or_mock(&session).await
            }
        }
    }

    async fn pending_or_mock(&self, session: &CheckoutSession) -> PaymentResult<CheckStatusOutcome> {
        if self.mock_fallback
            && self
                .store
                .should_mock_paid(&session.checkout_id, session.created_at)
        {
            info!("Verify endpoint inconclusive, applying mock payment");
            let paid_at = self.store.now();
            return Ok(self.mark_paid(session, paid_at).await);
        }

        self.store
            .update_session_status(&session.checkout_id, SessionStatus::Pending, None);
        Ok(CheckStatusOutcome::Pending)
    }

    async fn mark_paid(&self, session: &CheckoutSession, paid_at: DateTime<Utc>) -> CheckStatusOutcome {
        self.store
            .update_session_status(&session.checkout_id, SessionStatus::Paid, Some(paid_at));

        let notification = PaymentReceived {
            amount_sats: session.amount_sats,
            paid_at,
            payment_reference: session.payment_reference.clone(),
        };

        // Local state is already paid; settlement delivery is best-effort.
        if let Err(e) = self
            .settlement
            .payment_received(&session.checkout_id, &notification)
            .await
        {
            warn!(
                checkout_id = %session.checkout_id,
                "Failed to notify settlement API of payment: {}", e
            );
        }

        CheckStatusOutcome::Paid {
            paid_at,
            amount_received: session.amount_sats,
        }
    }

    fn lock_for(&self, checkout_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(checkout_id.to_string())
            .or_default()
            .clone()
    }

    fn release_lock(&self, checkout_id: &str) {
        let mut locks = self.locks.lock();
        if locks
            .get(checkout_id)
            .is_some_and(|l| Arc::strong_count(l) == 1)
        {
            locks.remove(checkout_id);
        }
    }
}

/// Removes the checkout's lock entry once the last caller leaves
struct LockLease<'a> {
    handler: &'a VerificationHandler,
    checkout_id: &'a str,
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        self.handler.release_lock(self.checkout_id);
    }
}
