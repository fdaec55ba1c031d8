//! # Request Handlers
//!
//! Axum request handlers for the checkout API.
//! Checkout records live in the settlement backend; invoices and payment
//! status live in the local session store.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pay_core::{
    CheckStatusOutcome, Checkout, CheckoutSession, CreateCheckout, InvoiceRegistration,
    NewSession, PaymentError,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    /// Amount in EUR
    pub amount: f64,
    /// Currency (only EUR is priced)
    #[serde(default)]
    pub currency: Option<String>,
    /// Free-form description passed to the settlement API
    #[serde(default)]
    pub description: Option<String>,
}

/// Confirm checkout request (body is optional)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCheckoutRequest {
    /// Overrides the checkout's and the server's default address
    #[serde(default)]
    pub lightning_address: Option<String>,
}

/// Checkout with its local session, if one exists
#[derive(Debug, Serialize)]
pub struct CheckoutDetails {
    #[serde(flatten)]
    pub checkout: Checkout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<CheckoutSession>,
}

/// Confirm checkout response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCheckoutResponse {
    pub checkout_id: String,
    pub address: String,
    pub amount_eur: f64,
    pub amount_sats: u64,
    /// BOLT11 payment request (render as QR)
    pub invoice: String,
    pub expires_at: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let response = ErrorResponse::new(
        status.canonical_reason().unwrap_or("Error"),
        err.code(),
    )
    .with_message(err.to_string());
    (status, Json(response))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "bringin-cart",
        "provider": state.strategy.provider_name(),
        "sessions": state.store.len(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a checkout in the settlement backend
#[instrument(skip(state, request), fields(amount = request.amount))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<(StatusCode, Json<Checkout>), ApiError> {
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(payment_error_to_response(PaymentError::InvalidAmount {
            amount: request.amount,
        }));
    }

    let currency = request.currency.unwrap_or_else(|| "EUR".to_string());
    if !currency.eq_ignore_ascii_case("EUR") {
        return Err(payment_error_to_response(PaymentError::InvalidRequest(
            format!("Unsupported currency: {}", currency),
        )));
    }

    let checkout = state
        .settlement
        .create(&CreateCheckout {
            amount: request.amount,
            currency: "EUR".to_string(),
            description: request.description,
        })
        .await
        .map_err(|e| {
            error!("Failed to create checkout: {}", e);
            payment_error_to_response(e)
        })?;

    info!("Created checkout {}", checkout.id);
    Ok((StatusCode::CREATED, Json(checkout)))
}

/// Get a checkout and its local session
#[instrument(skip(state))]
pub async fn get_checkout(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
) -> Result<Json<CheckoutDetails>, ApiError> {
    let checkout = state
        .settlement
        .get(&checkout_id)
        .await
        .map_err(payment_error_to_response)?;

    Ok(Json(CheckoutDetails {
        session: state.store.get_session(&checkout_id),
        checkout,
    }))
}

/// Confirm a checkout: issue an invoice and start tracking it
#[instrument(skip(state, body))]
pub async fn confirm_checkout(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
    body: Bytes,
) -> Result<Json<ConfirmCheckoutResponse>, ApiError> {
    let request: ConfirmCheckoutRequest = if body.is_empty() {
        ConfirmCheckoutRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            payment_error_to_response(PaymentError::InvalidRequest(format!(
                "Invalid request body: {}",
                e
            )))
        })?
    };

    let checkout = state
        .settlement
        .confirm(&checkout_id)
        .await
        .map_err(payment_error_to_response)?;

    let address = request
        .lightning_address
        .or(checkout.lightning_address)
        .unwrap_or_else(|| state.default_address.clone());

    let invoice = state
        .strategy
        .create_invoice(checkout.amount, &address)
        .await
        .map_err(|e| {
            warn!("Invoice creation failed: {}", e);
            payment_error_to_response(e)
        })?;

    state
        .settlement
        .register_invoice(
            &checkout_id,
            &InvoiceRegistration {
                invoice: invoice.payment_request.clone(),
                amount_sats: invoice.amount_sats,
                expires_at: invoice.expires_at,
                payment_reference: invoice.payment_reference.clone(),
            },
        )
        .await
        .map_err(|e| {
            error!("Failed to register invoice: {}", e);
            payment_error_to_response(e)
        })?;

    let session = state
        .store
        .create_session(NewSession::from_invoice(&checkout_id, &invoice));

    info!(
        "Checkout {} awaiting {} sats at {}",
        checkout_id, session.amount_sats, session.address
    );

    Ok(Json(ConfirmCheckoutResponse {
        checkout_id: session.checkout_id,
        address: session.address,
        amount_eur: session.amount_eur,
        amount_sats: session.amount_sats,
        invoice: session.invoice,
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

/// Poll the payment status of a checkout
#[instrument(skip(state))]
pub async fn checkout_status(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
) -> Result<Json<CheckStatusOutcome>, ApiError> {
    state
        .verifier
        .check_status(&checkout_id)
        .await
        .map(Json)
        .map_err(payment_error_to_response)
}

/// Stop tracking a checkout
#[instrument(skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete_session(&checkout_id) {
        info!("Deleted session {}", checkout_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(payment_error_to_response(PaymentError::SessionNotFound {
            session_id: checkout_id,
        }))
    }
}
