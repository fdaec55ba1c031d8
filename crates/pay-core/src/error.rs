//! # Payment Error Types
//!
//! Typed error handling for the bringin-cart payment engine.
//! All payment operations return `Result<T, PaymentError>`.
//!
//! Every variant maps to a stable string code (see [`PaymentError::code`])
//! which is what API clients match on.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Lightning address is not of the form `user@domain`
    #[error("Invalid Lightning address: {address}")]
    InvalidAddress { address: String },

    /// No Lightning address was supplied
    #[error("Missing Lightning address")]
    MissingAddress,

    /// Amount is zero, negative or not a number
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    /// Discovery endpoint answered with a non-success HTTP status
    #[error("LNURL discovery failed with HTTP {status}")]
    FetchFailed { status: u16 },

    /// Discovery endpoint answered with an unusable body
    #[error("Invalid LNURL response: {0}")]
    InvalidResponse(String),

    /// Network or parse failure during discovery
    #[error("LNURL discovery error: {0}")]
    FetchError(String),

    /// Requested amount outside the sendable bounds advertised by the provider
    #[error("Amount {amount_msats} msat outside sendable range [{min_msats}, {max_msats}]")]
    AmountOutOfRange {
        amount_msats: u64,
        min_msats: u64,
        max_msats: u64,
    },

    /// Invoice callback or verify endpoint answered with a non-success HTTP status
    #[error("Provider request failed with HTTP {status}")]
    RequestFailed { status: u16 },

    /// Invoice callback reported an error or returned no invoice
    #[error("Provider request error: {0}")]
    RequestError(String),

    /// Checkout session not tracked by this process
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// Settlement API call failed
    #[error("Settlement API error: {0}")]
    Settlement(String),
}

impl PaymentError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Configuration(_) => "configuration_error",
            PaymentError::InvalidRequest(_) => "invalid_request",
            PaymentError::InvalidAddress { .. } => "invalid_address",
            PaymentError::MissingAddress => "missing_address",
            PaymentError::InvalidAmount { .. } => "invalid_amount",
            PaymentError::FetchFailed { .. } => "fetch_failed",
            PaymentError::InvalidResponse(_) => "invalid_response",
            PaymentError::FetchError(_) => "fetch_error",
            PaymentError::AmountOutOfRange { .. } => "amount_out_of_range",
            PaymentError::RequestFailed { .. } => "request_failed",
            PaymentError::RequestError(_) => "request_error",
            PaymentError::SessionNotFound { .. } => "session_not_found",
            PaymentError::Settlement(_) => "settlement_error",
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::InvalidAddress { .. } => 400,
            PaymentError::MissingAddress => 400,
            PaymentError::InvalidAmount { .. } => 400,
            PaymentError::AmountOutOfRange { .. } => 400,
            PaymentError::FetchFailed { .. } => 502,
            PaymentError::InvalidResponse(_) => 502,
            PaymentError::RequestFailed { .. } => 502,
            PaymentError::RequestError(_) => 502,
            PaymentError::FetchError(_) => 503,
            PaymentError::SessionNotFound { .. } => 404,
            PaymentError::Settlement(_) => 502,
        }
    }

    /// Returns true if a later attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::FetchError(_)
                | PaymentError::FetchFailed { .. }
                | PaymentError::RequestFailed { .. }
                | PaymentError::Settlement(_)
        )
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
