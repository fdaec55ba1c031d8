//! # pay-bringin
//!
//! Bringin Lightning Address payment strategy for bringin-cart-rs.
//!
//! Invoices are obtained over LNURL-pay:
//!
//! 1. **Discovery** - `GET https://{domain}/.well-known/lnurlp/{user}`
//! 2. **Invoice** - `GET {callback}?amount={msats}`
//! 3. **Verify** - the returned (or derived) verify URL is polled until the
//!    invoice is paid or expires
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_bringin::{BringinConfig, BringinStrategy};
//! use pay_core::{PaymentStrategy, PolicyConfig};
//!
//! let strategy = BringinStrategy::new(BringinConfig::from_env(&PolicyConfig::default())?)?;
//!
//! let invoice = strategy.create_invoice(29.99, strategy.default_address()).await?;
//! // Show invoice.payment_request as a QR code, then poll:
//! let status = strategy.check_status(&invoice.verify_url).await?;
//! ```

pub mod address;
pub mod config;
pub mod lnurl;
pub mod strategy;
pub mod verify;

// Re-exports
pub use address::{resolve_address, LightningAddress};
pub use config::BringinConfig;
pub use lnurl::{derive_verify_url, InvoiceResponse, LnurlClient, PayParams, VerifySource};
pub use strategy::BringinStrategy;
pub use verify::{parse_verify_response, VerifySignal};
