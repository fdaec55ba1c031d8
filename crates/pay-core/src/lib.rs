//! # pay-core
//!
//! Core types and traits for the bringin-cart payment engine.
//!
//! This crate provides:
//! - `PaymentStrategy` trait for invoice-issuing providers
//! - `SessionStore` for tracking in-flight checkouts
//! - `VerificationHandler`, the polled payment-confirmation state machine
//! - `SettlementApi` trait for the checkout backend of record
//! - `Clock`, `ExchangeRate` and `PolicyConfig` policy plumbing
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{NewSession, SessionStore, SystemClock, VerificationHandler};
//!
//! let store = Arc::new(SessionStore::new(Arc::new(SystemClock)));
//!
//! // Issue an invoice and track it
//! let invoice = strategy.create_invoice(29.99, "shop@bringin.xyz").await?;
//! store.create_session(NewSession::from_invoice(&checkout_id, &invoice));
//!
//! // Poll until terminal
//! let handler = VerificationHandler::new(store, strategy, settlement);
//! let outcome = handler.check_status(&checkout_id).await?;
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod rate;
pub mod session;
pub mod settlement;
pub mod store;
pub mod strategy;
pub mod verification;

// Re-exports for convenience
pub use clock::{Clock, MockClock, SharedClock, SystemClock};
pub use config::PolicyConfig;
pub use error::{PaymentError, PaymentResult};
pub use rate::ExchangeRate;
pub use session::{CheckoutSession, NewSession, SessionStatus};
pub use settlement::{
    BoxedSettlementApi, Checkout, CreateCheckout, InvoiceRegistration, PaymentReceived,
    SettlementApi,
};
pub use store::{SessionStore, StoreSettings};
pub use strategy::{BoxedPaymentStrategy, Invoice, InvoiceStatus, PaymentStrategy};
pub use verification::{CheckStatusOutcome, VerificationHandler};
