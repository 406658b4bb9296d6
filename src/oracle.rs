//! The Market Price Oracle (C1): a pluggable reference-price source.

use crate::domain::Commodity;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicU64, Ordering};

/// Returns the current reference price for a commodity. Backed by a live
/// market-data feed in production; the core requires only that
/// implementations be cheap to call and safe to invoke from many threads
/// concurrently (§4.8, §5 "suspension points").
pub trait MarketPriceOracle: Send + Sync {
    /// The current reference price for `commodity`.
    fn price(&self, commodity: Commodity) -> Decimal;
}

fn base_price(commodity: Commodity) -> Decimal {
    match commodity {
        Commodity::CrudeOil => dec!(80.00),
        Commodity::NaturalGas => dec!(3.50),
        Commodity::HeatingOil => dec!(2.75),
        Commodity::Gasoline => dec!(2.60),
        Commodity::RenewableCertificates => dec!(25.00),
        Commodity::CarbonCredits => dec!(60.00),
    }
}

/// Deterministic pure-function stub: `base_price(commodity) * (1 +/- jitter)`
/// (§4.8). `jitter` bounds the fractional deviation from the base price;
/// the actual sign and magnitude are derived from an internal counter so
/// repeated calls are deterministic given the same call sequence, without
/// needing a wall-clock or external entropy source.
pub struct StubOracle {
    jitter: Decimal,
    calls: AtomicU64,
}

impl StubOracle {
    /// `jitter` must be in `[0, 1)`; it bounds the fractional swing around
    /// the base price.
    pub fn new(jitter: Decimal) -> Self {
        Self {
            jitter,
            calls: AtomicU64::new(0),
        }
    }

    /// A stub with zero jitter: always returns the exact base price. Useful
    /// for deterministic scenario tests (§8).
    pub fn fixed() -> Self {
        Self::new(Decimal::ZERO)
    }
}

impl Default for StubOracle {
    fn default() -> Self {
        Self::new(dec!(0.01))
    }
}

impl MarketPriceOracle for StubOracle {
    fn price(&self, commodity: Commodity) -> Decimal {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        let base = base_price(commodity);
        if self.jitter.is_zero() {
            return base;
        }
        // Alternate the jitter sign deterministically across calls so the
        // stub is pure but not constant.
        let sign = if n % 2 == 0 { Decimal::ONE } else { -Decimal::ONE };
        base * (Decimal::ONE + sign * self.jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_oracle_returns_base_price() {
        let oracle = StubOracle::fixed();
        assert_eq!(oracle.price(Commodity::CrudeOil), dec!(80.00));
        assert_eq!(oracle.price(Commodity::CrudeOil), dec!(80.00));
    }

    #[test]
    fn jittered_oracle_alternates_around_base() {
        let oracle = StubOracle::new(dec!(0.10));
        let base = base_price(Commodity::NaturalGas);
        let first = oracle.price(Commodity::NaturalGas);
        let second = oracle.price(Commodity::NaturalGas);
        assert_eq!(first, base * dec!(1.10));
        assert_eq!(second, base * dec!(0.90));
    }
}
