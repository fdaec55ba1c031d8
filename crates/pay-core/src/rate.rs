//! # Exchange Rate
//!
//! Fixed linear EUR/BTC conversion used to price invoices.
//! The rate is a placeholder policy value, not a market quote.

use serde::{Deserialize, Serialize};

/// Satoshis per bitcoin
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// Millisatoshis per satoshi
pub const MSATS_PER_SAT: u64 = 1_000;

/// Default price of one BTC in EUR
pub const DEFAULT_BTC_PRICE_EUR: f64 = 100_000.0;

/// Fixed EUR price of one bitcoin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub btc_price_eur: f64,
}

impl ExchangeRate {
    pub fn new(btc_price_eur: f64) -> Self {
        Self { btc_price_eur }
    }

    /// Convert EUR to satoshis (round half-up).
    ///
    /// `None` when the result is not a representable satoshi count, e.g. a
    /// non-finite input or a zero price.
    pub fn eur_to_sats(&self, eur: f64) -> Option<u64> {
        let sats = (eur * SATS_PER_BTC / self.btc_price_eur + 0.5).floor();
        if !sats.is_finite() || sats < 0.0 || sats >= u64::MAX as f64 {
            return None;
        }
        Some(sats as u64)
    }

    /// Convert satoshis back to EUR (no rounding)
    pub fn sats_to_eur(&self, sats: u64) -> f64 {
        sats as f64 * self.btc_price_eur / SATS_PER_BTC
    }

    /// Satoshis to millisatoshis, `None` on overflow
    pub fn sats_to_msats(sats: u64) -> Option<u64> {
        sats.checked_mul(MSATS_PER_SAT)
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self::new(DEFAULT_BTC_PRICE_EUR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_is_thousand_sats_per_euro() {
        let rate = ExchangeRate::default();
        assert_eq!(rate.eur_to_sats(1.0), Some(1_000));
        assert_eq!(rate.eur_to_sats(29.99), Some(29_990));
        assert_eq!(rate.sats_to_eur(1_000), 1.0);
    }

    #[test]
    fn test_rounds_half_up() {
        let rate = ExchangeRate::default();
        // 0.0005 EUR = 0.5 sat
        assert_eq!(rate.eur_to_sats(0.0005), Some(1));
        assert_eq!(rate.eur_to_sats(0.0004), Some(0));
    }

    #[test]
    fn test_conversion_round_trip_within_one_unit() {
        let rate = ExchangeRate::default();
        for eur in [0.01, 0.5, 1.234, 19.99, 250.0, 1234.5678] {
            let back = rate.sats_to_eur(rate.eur_to_sats(eur).unwrap());
            let one_sat = rate.sats_to_eur(1);
            assert!((back - eur).abs() <= one_sat, "eur={} back={}", eur, back);
        }
    }

    #[test]
    fn test_msats() {
        assert_eq!(ExchangeRate::sats_to_msats(21), Some(21_000));
        assert_eq!(ExchangeRate::sats_to_msats(u64::MAX / 10), None);
    }

    #[test]
    fn test_unrepresentable_amounts() {
        let rate = ExchangeRate::default();
        assert_eq!(rate.eur_to_sats(f64::INFINITY), None);
        assert_eq!(rate.eur_to_sats(f64::NAN), None);
        assert_eq!(rate.eur_to_sats(1.0e30), None);
        assert_eq!(rate.eur_to_sats(-1.0), None);

        // 2e13 EUR fits in sats but not in msats
        let sats = rate.eur_to_sats(2.0e13).unwrap();
        assert_eq!(ExchangeRate::sats_to_msats(sats), None);

        assert_eq!(ExchangeRate::new(0.0).eur_to_sats(1.0), None);
    }
}
