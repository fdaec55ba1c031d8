//! # Settlement Client
//!
//! HTTP client for the checkout backend of record.
//!
//! | Operation          | Request                                      |
//! |--------------------|----------------------------------------------|
//! | `create`           | `POST {base}/checkout`                       |
//! | `get`              | `GET {base}/checkout/{id}`                   |
//! | `confirm`          | `POST {base}/checkout/{id}/confirm`          |
//! | `register_invoice` | `POST {base}/checkout/{id}/invoice`          |
//! | `payment_received` | `POST {base}/checkout/{id}/payment-received` |

use async_trait::async_trait;
use pay_core::{
    Checkout, CreateCheckout, InvoiceRegistration, PaymentError, PaymentReceived,
    PaymentResult, SettlementApi,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Settlement API over HTTP
#[derive(Debug, Clone)]
pub struct HttpSettlementClient {
    client: Client,
    base_url: String,
}

impl HttpSettlementClient {
    /// Create a client for `base_url` (trailing slash ignored)
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn checkout_url(&self, checkout_id: &str, suffix: &str) -> String {
        format!("{}/checkout/{}{}", self.base_url, checkout_id, suffix)
    }

    async fn send(&self, request: RequestBuilder) -> PaymentResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::Settlement(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(PaymentError::Settlement(format!("HTTP {}: {}", status, body)))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| PaymentError::Settlement(format!("unreadable response: {}", e)))
    }
}

#[async_trait]
impl SettlementApi for HttpSettlementClient {
    #[instrument(skip(self))]
    async fn create(&self, request: &CreateCheckout) -> PaymentResult<Checkout> {
        let url = format!("{}/checkout", self.base_url);
        self.send_json(self.client.post(url).json(request)).await
    }

    #[instrument(skip(self))]
    async fn get(&self, checkout_id: &str) -> PaymentResult<Checkout> {
        self.send_json(self.client.get(self.checkout_url(checkout_id, "")))
            .await
    }

    #[instrument(skip(self))]
    async fn confirm(&self, checkout_id: &str) -> PaymentResult<Checkout> {
        self.send_json(self.client.post(self.checkout_url(checkout_id, "/confirm")))
            .await
    }

    #[instrument(skip(self, registration))]
    async fn register_invoice(
        &self,
        checkout_id: &str,
        registration: &InvoiceRegistration,
    ) -> PaymentResult<()> {
        let url = self.checkout_url(checkout_id, "/invoice");
        self.send(self.client.post(url).json(registration)).await?;
        debug!("Invoice registered");
        Ok(())
    }

    #[instrument(skip(self, payment))]
    async fn payment_received(
        &self,
        checkout_id: &str,
        payment: &PaymentReceived,
    ) -> PaymentResult<()> {
        let url = self.checkout_url(checkout_id, "/payment-received");
        self.send(self.client.post(url).json(payment)).await?;
        debug!("Payment notification delivered");
        Ok(())
    }
}
