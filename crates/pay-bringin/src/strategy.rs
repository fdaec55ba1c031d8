//! # Bringin Strategy
//!
//! `PaymentStrategy` implementation for Bringin Lightning Addresses.
//! Invoice creation runs discovery → invoice request → verify URL
//! derivation and stops at the first failure.

use crate::address::LightningAddress;
use crate::config::BringinConfig;
use crate::lnurl::{derive_verify_url, LnurlClient};
use async_trait::async_trait;
use chrono::Utc;
use pay_core::{
    ExchangeRate, Invoice, InvoiceStatus, PaymentError, PaymentResult, PaymentStrategy,
};
use reqwest::Client;
use tracing::{info, instrument};

/// Bringin Lightning Address strategy
pub struct BringinStrategy {
    config: BringinConfig,
    lnurl: LnurlClient,
}

impl BringinStrategy {
    /// Create a new Bringin strategy
    pub fn new(config: BringinConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let lnurl = LnurlClient::new(client, config.scheme.clone());
        Ok(Self { config, lnurl })
    }

    pub fn config(&self) -> &BringinConfig {
        &self.config
    }

    /// Default receiving address
    pub fn default_address(&self) -> &str {
        &self.config.lightning_address
    }
}

#[async_trait]
impl PaymentStrategy for BringinStrategy {
    #[instrument(skip(self))]
    async fn create_invoice(&self, amount_eur: f64, address: &str) -> PaymentResult<Invoice> {
        if address.trim().is_empty() {
            return Err(PaymentError::MissingAddress);
        }
        if !amount_eur.is_finite() || amount_eur <= 0.0 {
            return Err(PaymentError::InvalidAmount { amount: amount_eur });
        }

        let invalid = || PaymentError::InvalidAmount { amount: amount_eur };
        let amount_sats = self.config.rate.eur_to_sats(amount_eur).ok_or_else(invalid)?;
        let amount_msats = ExchangeRate::sats_to_msats(amount_sats).ok_or_else(invalid)?;

        let address = LightningAddress::parse(address)?;
        let params = self.lnurl.fetch_pay_params(&address).await?;
        let response = self
            .lnurl
            .request_invoice(
                &params.callback,
                amount_msats,
                params.min_sendable,
                params.max_sendable,
            )
            .await?;

        let verify_url =
            derive_verify_url(&response, &params.callback, &address, self.lnurl.scheme());
        let expires_at = response
            .expires_at
            .unwrap_or_else(|| Utc::now() + self.config.invoice_expiry);

        info!(
            "Issued invoice: address={}, sats={}, verify_url={}",
            address, amount_sats, verify_url
        );

        Ok(Invoice {
            address: address.to_string(),
            amount_eur,
            amount_sats,
            amount_msats,
            payment_request: response.pr,
            verify_url,
            expires_at,
            payment_reference: response.reference,
        })
    }

    async fn check_status(&self, verify_url: &str) -> PaymentResult<InvoiceStatus> {
        self.lnurl.check_status(verify_url).await
    }

    fn provider_name(&self) -> &'static str {
        "bringin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider(invoice_body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/lnurlp/shop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tag": "payRequest",
                "callback": format!("{}/lnurlp/shop/callback", server.uri()),
                "minSendable": 1_000,
                "maxSendable": 50_000_000,
                "metadata": "[[\"text/plain\",\"Pay shop\"]]"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lnurlp/shop/callback"))
            .and(query_param("amount", "29990000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(invoice_body))
            .mount(&server)
            .await;
        server
    }

    fn strategy_for(server: &MockServer) -> (BringinStrategy, String) {
        let address = format!("shop@{}", server.address());
        let config = BringinConfig::new(address.clone()).with_scheme("http");
        (BringinStrategy::new(config).unwrap(), address)
    }

    #[tokio::test]
    async fn test_create_invoice_end_to_end() {
        let server = provider(json!({"pr": "lnbc299u1p", "paymentHash": "deadbeef"})).await;
        let (strategy, address) = strategy_for(&server);

        let before = Utc::now();
        let invoice = strategy.create_invoice(29.99, &address).await.unwrap();

        assert_eq!(invoice.amount_sats, 29_990);
        assert_eq!(invoice.amount_msats, 29_990_000);
        assert_eq!(invoice.payment_request, "lnbc299u1p");
        assert_eq!(
            invoice.verify_url,
            format!("http://{}/lnurlp/shop/verify/deadbeef", server.address())
        );
        assert!(invoice.expires_at >= before + Duration::minutes(15));
        assert!(invoice.expires_at <= Utc::now() + Duration::minutes(15));
    }

    #[tokio::test]
    async fn test_create_invoice_uses_provider_expiry_and_verify() {
        let server = provider(json!({
            "pr": "lnbc299u1p",
            "verify": "https://bringin.xyz/v/123",
            "expiresAt": "2030-01-01T00:00:00Z",
            "reference": "BR-77"
        }))
        .await;
        let (strategy, address) = strategy_for(&server);

        let invoice = strategy.create_invoice(29.99, &address).await.unwrap();
        assert_eq!(invoice.verify_url, "https://bringin.xyz/v/123");
        assert_eq!(invoice.expires_at.to_rfc3339(), "2030-01-01T00:00:00+00:00");
        assert_eq!(invoice.payment_reference.as_deref(), Some("BR-77"));
    }

    #[tokio::test]
    async fn test_create_invoice_validates_inputs() {
        let strategy = BringinStrategy::new(BringinConfig::new("shop@bringin.xyz")).unwrap();

        let err = strategy.create_invoice(10.0, "  ").await.unwrap_err();
        assert_eq!(err.code(), "missing_address");

        for amount in [0.0, -5.0, f64::NAN] {
            let err = strategy
                .create_invoice(amount, "shop@bringin.xyz")
                .await
                .unwrap_err();
            assert_eq!(err.code(), "invalid_amount");
        }

        // Too large to express in millisatoshis
        let err = strategy
            .create_invoice(2.0e13, "shop@bringin.xyz")
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::InvalidAmount { amount: 2.0e13 });

        let err = strategy.create_invoice(10.0, "not-an-address").await.unwrap_err();
        assert_eq!(err.code(), "invalid_address");
    }

    #[tokio::test]
    async fn test_create_invoice_stops_at_discovery_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/lnurlp/shop"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lnurlp/shop/callback"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (strategy, address) = strategy_for(&server);
        let err = strategy.create_invoice(29.99, &address).await.unwrap_err();
        assert_eq!(err, PaymentError::FetchFailed { status: 502 });
    }
}
