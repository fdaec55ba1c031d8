//! # pay-api
//!
//! HTTP API layer for bringin-cart-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for checkout confirmation and payment polling
//! - HTTP client for the settlement backend
//! - Background sweep of expired sessions
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/checkout` | Create checkout |
//! | GET | `/api/v1/checkout/{id}` | Get checkout |
//! | POST | `/api/v1/checkout/{id}/confirm` | Issue Lightning invoice |
//! | GET | `/api/v1/checkout/{id}/status` | Poll payment status |
//! | DELETE | `/api/v1/checkout/{id}/session` | Drop session |

pub mod handlers;
pub mod routes;
pub mod settlement;
pub mod state;
pub mod sweep;

pub use routes::create_router;
pub use settlement::HttpSettlementClient;
pub use state::{AppConfig, AppState};
pub use sweep::spawn_cleanup_task;
