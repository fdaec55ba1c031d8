//! # Payment Verification
//!
//! Polls a verify endpoint and folds the response into a tri-state status.
//!
//! Providers disagree on shape, so every known signal is collected first
//! and then resolved by a fixed precedence: paid > expired > pending.
//!
//! | Shape                    | Signal   |
//! |--------------------------|----------|
//! | `settled: true`          | paid     |
//! | `paid: true`             | paid     |
//! | `status: "paid"` etc.    | paid     |
//! | `expired: true`          | expired  |
//! | `status: "expired"`      | expired  |
//! | `pending: true`          | pending  |
//! | `status: "pending"` etc. | pending  |

use crate::lnurl::{timestamp_field, LnurlClient};
use pay_core::{InvoiceStatus, PaymentError, PaymentResult};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

/// One status signal found in a verify response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifySignal {
    Paid,
    Expired,
    Pending,
}

const PAID_WORDS: &[&str] = &["paid", "settled", "complete", "completed", "success", "succeeded"];
const EXPIRED_WORDS: &[&str] = &["expired"];
const PENDING_WORDS: &[&str] = &["pending", "open", "unpaid", "waiting"];

fn flag_signal(obj: &Map<String, Value>, key: &str, signal: VerifySignal) -> Option<VerifySignal> {
    match obj.get(key) {
        Some(Value::Bool(true)) => Some(signal),
        _ => None,
    }
}

fn status_signal(obj: &Map<String, Value>) -> Option<VerifySignal> {
    let status = obj.get("status")?.as_str()?.to_ascii_lowercase();
    if PAID_WORDS.contains(&status.as_str()) {
        Some(VerifySignal::Paid)
    } else if EXPIRED_WORDS.contains(&status.as_str()) {
        Some(VerifySignal::Expired)
    } else if PENDING_WORDS.contains(&status.as_str()) {
        Some(VerifySignal::Pending)
    } else {
        None
    }
}

/// Collect every recognised signal from a verify body
pub fn collect_signals(body: &Value) -> Vec<VerifySignal> {
    let Some(obj) = body.as_object() else {
        return Vec::new();
    };

    [
        flag_signal(obj, "settled", VerifySignal::Paid),
        flag_signal(obj, "paid", VerifySignal::Paid),
        flag_signal(obj, "expired", VerifySignal::Expired),
        flag_signal(obj, "pending", VerifySignal::Pending),
        status_signal(obj),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Resolve a verify body to a status
pub fn parse_verify_response(body: &Value) -> InvoiceStatus {
    let signals = collect_signals(body);

    if signals.contains(&VerifySignal::Paid) {
        let paid_at = body.as_object().and_then(|obj| {
            timestamp_field(obj, &["paidAt", "paid_at", "settledAt", "settled_at"])
        });
        InvoiceStatus::Paid { paid_at }
    } else if signals.contains(&VerifySignal::Expired) {
        InvoiceStatus::Expired
    } else {
        InvoiceStatus::Pending
    }
}

impl LnurlClient {
    /// Poll a verify URL once.
    ///
    /// 404/503 and transport or parse failures read as pending so the
    /// caller's poll loop keeps going. Any other HTTP error is `request_failed`.
    #[instrument(skip(self))]
    pub async fn check_status(&self, verify_url: &str) -> PaymentResult<InvoiceStatus> {
        let response = match self.http().get(verify_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Verify endpoint unreachable: {}", e);
                return Ok(InvoiceStatus::Pending);
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::SERVICE_UNAVAILABLE {
            debug!("Verify endpoint unavailable ({}), reporting pending", status);
            return Ok(InvoiceStatus::Pending);
        }
        if !status.is_success() {
            return Err(PaymentError::RequestFailed {
                status: status.as_u16(),
            });
        }

        match response.json::<Value>().await {
            Ok(body) => Ok(parse_verify_response(&body)),
            Err(e) => {
                warn!("Unreadable verify response: {}", e);
                Ok(InvoiceStatus::Pending)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_paid_shapes() {
        for body in [
            json!({"settled": true}),
            json!({"paid": true}),
            json!({"status": "PAID"}),
            json!({"status": "settled", "preimage": "00"}),
            json!({"status": "OK", "settled": true, "pr": "lnbc1"}),
        ] {
            assert!(
                matches!(parse_verify_response(&body), InvoiceStatus::Paid { .. }),
                "body {}",
                body
            );
        }
    }

    #[test]
    fn test_paid_beats_expired() {
        let body = json!({"settled": true, "expired": true});
        assert!(matches!(
            parse_verify_response(&body),
            InvoiceStatus::Paid { .. }
        ));

        let body = json!({"status": "expired", "paid": true});
        assert!(matches!(
            parse_verify_response(&body),
            InvoiceStatus::Paid { .. }
        ));
    }

    #[test]
    fn test_expired_beats_pending() {
        assert_eq!(
            parse_verify_response(&json!({"expired": true, "pending": true})),
            InvoiceStatus::Expired
        );
        assert_eq!(
            parse_verify_response(&json!({"status": "expired"})),
            InvoiceStatus::Expired
        );
    }

    #[test]
    fn test_pending_default() {
        for body in [
            json!({"settled": false}),
            json!({"status": "OK"}),
            json!({"status": "ERROR", "reason": "Not found"}),
            json!({}),
            json!([1, 2, 3]),
        ] {
            assert_eq!(parse_verify_response(&body), InvoiceStatus::Pending, "body {}", body);
        }
    }

    #[test]
    fn test_paid_timestamp() {
        let body = json!({"paid": true, "paidAt": "2024-05-01T12:00:00Z"});
        assert_eq!(
            parse_verify_response(&body),
            InvoiceStatus::Paid {
                paid_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
            }
        );

        let body = json!({"settled": true, "settled_at": 1714564800});
        assert_eq!(
            parse_verify_response(&body),
            InvoiceStatus::Paid {
                paid_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
            }
        );
    }

    async fn serve(status: u16, body: Option<Value>) -> MockServer {
        let server = MockServer::start().await;
        let template = match body {
            Some(body) => ResponseTemplate::new(status).set_body_json(body),
            None => ResponseTemplate::new(status),
        };
        Mock::given(method("GET"))
            .and(path("/lnurlp/shop/verify/hash"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_check_status_paid() {
        let server = serve(200, Some(json!({"status": "OK", "settled": true}))).await;
        let client = LnurlClient::new(Client::new(), "http");

        let status = client
            .check_status(&format!("{}/lnurlp/shop/verify/hash", server.uri()))
            .await
            .unwrap();
        assert_eq!(status, InvoiceStatus::Paid { paid_at: None });
    }

    #[tokio::test]
    async fn test_check_status_unreachable_codes_are_pending() {
        let client = LnurlClient::new(Client::new(), "http");
        for code in [404, 503] {
            let server = serve(code, None).await;
            let status = client
                .check_status(&format!("{}/lnurlp/shop/verify/hash", server.uri()))
                .await
                .unwrap();
            assert_eq!(status, InvoiceStatus::Pending);
        }
    }

    #[tokio::test]
    async fn test_check_status_other_errors_fail() {
        let server = serve(500, None).await;
        let client = LnurlClient::new(Client::new(), "http");

        let err = client
            .check_status(&format!("{}/lnurlp/shop/verify/hash", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::RequestFailed { status: 500 });
    }

    #[tokio::test]
    async fn test_check_status_network_error_is_pending() {
        let client = LnurlClient::new(Client::new(), "http");
        // Nothing listens on port 9 locally
        let status = client
            .check_status("http://127.0.0.1:9/lnurlp/shop/verify/hash")
            .await
            .unwrap();
        assert_eq!(status, InvoiceStatus::Pending);
    }
}
