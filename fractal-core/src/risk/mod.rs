//! Risk Gate (`spec.md` §4.6).
//!
//! Grounded on the teacher's runtime `RiskLimits`/`RiskManager` architecture
//! described in `bog-core/src/risk/mod.rs` (a layered
//! `PreTradeValidator -> RiskManager -> CircuitBreaker -> RateLimiter`
//! pipeline with per-call `validate_*` methods returning a rejection enum),
//! rather than `bog-core/src/engine/risk.rs`'s compile-time
//! `#[cfg(feature = ...)]` constant-limit design — this spec's limits are
//! portfolio-relative percentages that must be configurable at runtime.

use crate::core::RejectReason;
use crate::order::Order;
use crate::portfolio::Portfolio;

/// Portfolio-relative risk thresholds (`spec.md` §4.6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLimits {
    /// Per-position cap: `order_value / portfolio_value` must not exceed this.
    pub per_position_fraction: f64,
    /// Aggregate exposure cap across all positions plus the new order.
    pub aggregate_exposure_fraction: f64,
    /// Capital adequacy: a BUY's order_value must not exceed this fraction of cash.
    pub capital_adequacy_fraction: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            per_position_fraction: 0.05,
            aggregate_exposure_fraction: 0.80,
            capital_adequacy_fraction: 0.95,
        }
    }
}

/// Validates an order against portfolio-relative limits before execution.
pub struct RiskGate {
    limits: RiskLimits,
}

impl RiskGate {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    /// `order`'s side determines whether the capital-adequacy check
    /// applies; `last_price` is the symbol's current mark.
    pub fn check(&self, order: &Order, last_price: f64, portfolio: &Portfolio) -> Result<(), RejectReason> {
        let order_value = order.quantity * last_price;
        let portfolio_value = portfolio.portfolio_value().max(1.0);

        if order_value / portfolio_value > self.limits.per_position_fraction {
            return Err(RejectReason::PositionSizeExceeded { order_value, portfolio_value });
        }

        let exposure_fraction = (portfolio.aggregate_exposure() + order_value) / portfolio_value;
        if exposure_fraction > self.limits.aggregate_exposure_fraction {
            return Err(RejectReason::AggregateExposureExceeded { exposure_fraction });
        }

        if order.side == crate::core::Side::Buy
            && order_value > self.limits.capital_adequacy_fraction * portfolio.cash()
        {
            return Err(RejectReason::InsufficientCapital { order_value, cash: portfolio.cash() });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::helpers::{market_order, test_portfolio};

    #[test]
    fn rejects_oversized_position() {
        let gate = RiskGate::new(RiskLimits::default());
        let portfolio = test_portfolio(1_000_000.0);
        let order = market_order("EURUSD", crate::core::Side::Buy, 1_000_000.0);
        let result = gate.check(&order, 1.10, &portfolio);
        match result {
            Err(RejectReason::PositionSizeExceeded { .. }) => {}
            other => panic!("expected PositionSizeExceeded, got {other:?}"),
        }
    }

    #[test]
    fn accepts_small_order() {
        let gate = RiskGate::new(RiskLimits::default());
        let portfolio = test_portfolio(1_000_000.0);
        let order = market_order("EURUSD", crate::core::Side::Buy, 1000.0);
        assert!(gate.check(&order, 1.10, &portfolio).is_ok());
    }

    #[test]
    fn rejects_insufficient_capital() {
        // Isolate the capital-adequacy check with a relaxed position-size
        // cap: with the spec's default 5% per-position cap this branch is
        // only reachable when cash is already a small fraction of the
        // portfolio, which independently trips the aggregate-exposure cap
        // first. A wider cap here tests the capital check on its own.
        let gate = RiskGate::new(RiskLimits {
            per_position_fraction: 1.0,
            aggregate_exposure_fraction: 1.0,
            capital_adequacy_fraction: 0.95,
        });
        let portfolio = test_portfolio(1_000.0);
        let order = market_order("EURUSD", crate::core::Side::Buy, 970.0);
        let result = gate.check(&order, 1.0, &portfolio);
        assert!(matches!(result, Err(RejectReason::InsufficientCapital { .. })));
    }
}
