//! # LNURL-pay Client
//!
//! Discovery (LUD-06/16), invoice requests against the advertised callback,
//! and derivation of the URL later polled for payment status.
//!
//! Every request is a single attempt; nothing here retries.

use crate::address::LightningAddress;
use chrono::{DateTime, Utc};
use pay_core::{PaymentError, PaymentResult};
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use tracing::{debug, error, instrument};

/// Tag an LNURL-pay discovery document must carry
pub const PAY_REQUEST_TAG: &str = "payRequest";

/// Payment parameters advertised by the discovery endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct PayParams {
    pub callback: String,
    pub min_sendable: u64,
    pub max_sendable: u64,
    pub metadata: String,
}

impl PayParams {
    /// Validate a discovery document
    pub fn from_json(body: &Value) -> PaymentResult<Self> {
        let obj = body.as_object().ok_or_else(|| {
            PaymentError::InvalidResponse("discovery body is not an object".to_string())
        })?;

        let tag = obj.get("tag").and_then(|v| v.as_str()).unwrap_or_default();
        if tag != PAY_REQUEST_TAG {
            return Err(PaymentError::InvalidResponse(format!(
                "unexpected tag {:?}",
                tag
            )));
        }

        let callback = obj
            .get("callback")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| PaymentError::InvalidResponse("missing callback".to_string()))?;

        let metadata = match obj.get("metadata") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                return Err(PaymentError::InvalidResponse("missing metadata".to_string()))
            }
            Some(other) => other.to_string(),
        };

        let min_sendable = numeric_field(obj, "minSendable")?;
        let max_sendable = numeric_field(obj, "maxSendable")?;

        Ok(Self {
            callback,
            min_sendable,
            max_sendable,
            metadata,
        })
    }
}

fn numeric_field(obj: &Map<String, Value>, key: &str) -> PaymentResult<u64> {
    let value = obj.get(key);
    value
        .and_then(|v| v.as_u64())
        .or_else(|| {
            value
                .and_then(|v| v.as_f64())
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        })
        .ok_or_else(|| PaymentError::InvalidResponse(format!("{} is not numeric", key)))
}

/// Invoice callback response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceResponse {
    /// BOLT11 payment request
    pub pr: String,
    /// Explicit verify URL (LUD-21)
    pub verify: Option<String>,
    /// One-time verification token
    pub token: Option<String>,
    pub payment_hash: Option<String>,
    pub checking_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub reference: Option<String>,
}

impl InvoiceResponse {
    /// Parse a callback body. Error status or a missing `pr` is a `request_error`.
    pub fn from_json(body: &Value) -> PaymentResult<Self> {
        let obj = body.as_object().ok_or_else(|| {
            PaymentError::RequestError("invoice body is not an object".to_string())
        })?;

        let status = obj.get("status").and_then(|v| v.as_str()).unwrap_or_default();
        if status.eq_ignore_ascii_case("ERROR") {
            let reason = obj
                .get("reason")
                .and_then(|v| v.as_str())
                .unwrap_or("provider returned an error");
            return Err(PaymentError::RequestError(reason.to_string()));
        }

        let pr = string_field(obj, &["pr"])
            .ok_or_else(|| PaymentError::RequestError("response missing invoice".to_string()))?;

        Ok(Self {
            pr,
            verify: string_field(obj, &["verify"]),
            token: string_field(obj, &["token"]),
            payment_hash: string_field(obj, &["paymentHash", "payment_hash"]),
            checking_id: string_field(obj, &["checkingId", "checking_id"]),
            expires_at: timestamp_field(obj, &["expiresAt", "expires_at"]),
            reference: string_field(obj, &["reference", "paymentReference", "payment_reference"]),
        })
    }

    /// Which verify URL source this response supports, in precedence order
    pub fn verify_source(&self) -> VerifySource<'_> {
        let payment_id = self.payment_hash.as_deref().or(self.checking_id.as_deref());
        match (self.verify.as_deref(), self.token.as_deref(), payment_id) {
            (Some(url), _, _) => VerifySource::Explicit(url),
            (None, Some(token), _) => VerifySource::Token(token),
            (None, None, Some(id)) => VerifySource::PaymentId(id),
            (None, None, None) => VerifySource::Callback,
        }
    }
}

/// Where the verify URL for an invoice comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifySource<'a> {
    /// Provider handed us the URL
    Explicit(&'a str),
    /// Callback rewritten to `/verify` with `?token=`
    Token(&'a str),
    /// Provider-specific URL keyed by payment hash or checking id
    PaymentId(&'a str),
    /// Callback rewritten to `/verify`, nothing else known
    Callback,
}

/// Build the URL to poll for payment status
pub fn derive_verify_url(
    response: &InvoiceResponse,
    callback: &str,
    address: &LightningAddress,
    scheme: &str,
) -> String {
    match response.verify_source() {
        VerifySource::Explicit(url) => url.to_string(),
        VerifySource::Token(token) => {
            append_query_param(&callback_to_verify(callback), "token", token)
        }
        VerifySource::PaymentId(id) => address.verify_url(scheme, id),
        VerifySource::Callback => callback_to_verify(callback),
    }
}

/// Replace a trailing `/callback` path segment with `/verify`, keeping any query
pub fn callback_to_verify(callback: &str) -> String {
    let (base, query) = match callback.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (callback, None),
    };

    let base = match base.strip_suffix("/callback") {
        Some(prefix) => format!("{}/verify", prefix),
        None => base.to_string(),
    };

    match query {
        Some(query) => format!("{}?{}", base, query),
        None => base,
    }
}

fn append_query_param(url: &str, key: &str, value: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair(key, value);
            parsed.to_string()
        }
        Err(_) => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{}{}{}={}", url, sep, key, value)
        }
    }
}

pub(crate) fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// RFC 3339 string or unix seconds
pub(crate) fn timestamp_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().filter_map(|k| obj.get(*k)).find_map(|v| match v {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    })
}

/// HTTP client for the LNURL-pay endpoints
#[derive(Debug, Clone)]
pub struct LnurlClient {
    client: Client,
    scheme: String,
}

impl LnurlClient {
    pub fn new(client: Client, scheme: impl Into<String>) -> Self {
        Self {
            client,
            scheme: scheme.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Fetch and validate the discovery document for `address`
    #[instrument(skip(self, address), fields(address = %address))]
    pub async fn fetch_pay_params(&self, address: &LightningAddress) -> PaymentResult<PayParams> {
        let url = address.discovery_url(&self.scheme);
        debug!("Fetching LNURL pay params from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PaymentError::FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("LNURL discovery failed: status={}", status);
            return Err(PaymentError::FetchFailed {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PaymentError::FetchError(e.to_string()))?;

        PayParams::from_json(&body)
    }

    /// Request an invoice for `amount_msats` from the callback
    #[instrument(skip(self))]
    pub async fn request_invoice(
        &self,
        callback: &str,
        amount_msats: u64,
        min_sendable: u64,
        max_sendable: u64,
    ) -> PaymentResult<InvoiceResponse> {
        if amount_msats < min_sendable || amount_msats > max_sendable {
            return Err(PaymentError::AmountOutOfRange {
                amount_msats,
                min_msats: min_sendable,
                max_msats: max_sendable,
            });
        }

        let url = append_query_param(callback, "amount", &amount_msats.to_string());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PaymentError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("Invoice request failed: status={}", status);
            return Err(PaymentError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PaymentError::RequestError(e.to_string()))?;

        InvoiceResponse::from_json(&body)
    }
}
