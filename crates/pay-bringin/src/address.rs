//! # Lightning Address
//!
//! Parsing of `user@domain` Lightning Addresses and the URLs derived from them.

use pay_core::{PaymentError, PaymentResult};
use std::fmt;

/// A parsed Lightning Address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightningAddress {
    pub user: String,
    pub domain: String,
}

impl LightningAddress {
    /// Parse `user@domain`. Exactly one `@` with non-empty parts on both sides.
    pub fn parse(address: &str) -> PaymentResult<Self> {
        let invalid = || PaymentError::InvalidAddress {
            address: address.to_string(),
        };

        let parts: Vec<&str> = address.trim().split('@').collect();
        match parts.as_slice() {
            [user, domain] if !user.is_empty() && !domain.is_empty() => Ok(Self {
                user: user.to_string(),
                domain: domain.to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    /// LNURL-pay discovery URL (LUD-16)
    pub fn discovery_url(&self, scheme: &str) -> String {
        format!(
            "{}://{}/.well-known/lnurlp/{}",
            scheme, self.domain, self.user
        )
    }

    /// Provider verify URL for a payment hash or checking id
    pub fn verify_url(&self, scheme: &str, payment_id: &str) -> String {
        format!(
            "{}://{}/lnurlp/{}/verify/{}",
            scheme, self.domain, self.user, payment_id
        )
    }
}

impl fmt::Display for LightningAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.domain)
    }
}

/// Resolve a Lightning Address to its HTTPS discovery URL
pub fn resolve_address(address: &str) -> PaymentResult<String> {
    Ok(LightningAddress::parse(address)?.discovery_url("https"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_valid_addresses() {
        assert_eq!(
            resolve_address("shop@bringin.xyz").unwrap(),
            "https://bringin.xyz/.well-known/lnurlp/shop"
        );
        assert_eq!(
            resolve_address("a.b-c@pay.example.com").unwrap(),
            "https://pay.example.com/.well-known/lnurlp/a.b-c"
        );
        // Deterministic
        assert_eq!(
            resolve_address("shop@bringin.xyz").unwrap(),
            resolve_address("shop@bringin.xyz").unwrap()
        );
    }

    #[test]
    fn test_resolve_malformed_addresses() {
        for bad in ["", "shop", "shop@", "@bringin.xyz", "a@b@c", "@", "shop@@bringin.xyz"] {
            let err = resolve_address(bad).unwrap_err();
            assert_eq!(err.code(), "invalid_address", "address {:?}", bad);
        }
    }

    #[test]
    fn test_verify_url_and_display() {
        let address = LightningAddress::parse("shop@bringin.xyz").unwrap();
        assert_eq!(
            address.verify_url("https", "abc123"),
            "https://bringin.xyz/lnurlp/shop/verify/abc123"
        );
        assert_eq!(address.to_string(), "shop@bringin.xyz");
    }
}
