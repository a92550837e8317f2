//! Portfolio/PnL Ledger (`spec.md` §4.8).
//!
//! `Portfolio` is mutable shared state accessed under a single exclusive
//! lock for the entire risk-check-then-commit critical section
//! (`spec.md` §5/§9). The teacher's lock-free, per-field-atomic `Position`
//! (`bog-core/src/core/types.rs`) is explicitly not reused here: that design
//! cannot express "hold one lock across the whole check-then-commit"
//! without a wrapping lock that would make the atomics pointless. Instead
//! this follows the teacher's `parking_lot::Mutex`-guarded-state pattern
//! used in `resilience::kill_switch`, with the update formulas themselves
//! taken from `distributed_hft_engine.py`'s `PortfolioManager`.

use crate::core::Side;
use std::collections::HashMap;

/// Per-symbol position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub quantity: f64,
    pub avg_entry_price: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub realized_pnl: f64,
    pub last_update_us: i64,
}

impl Position {
    fn flat() -> Self {
        Self {
            quantity: 0.0,
            avg_entry_price: 0.0,
            market_value: 0.0,
            unrealized_pnl: 0.0,
            realized_pnl: 0.0,
            last_update_us: 0,
        }
    }
}

/// Outcome of applying a fill, used by the execution engine to build a
/// `TradeExecution` record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillOutcome {
    pub realized_pnl: f64,
}

/// Cash, positions, and the running peak/drawdown/trade-count bookkeeping.
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: f64,
    positions: HashMap<String, Position>,
    peak_portfolio_value: f64,
    max_drawdown: f64,
    total_trades: u64,
    winning_trades: u64,
    cumulative_pnl: f64,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            positions: HashMap::new(),
            peak_portfolio_value: initial_cash,
            max_drawdown: 0.0,
            total_trades: 0,
            winning_trades: 0,
            cumulative_pnl: 0.0,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    pub fn winning_trades(&self) -> u64 {
        self.winning_trades
    }

    pub fn cumulative_pnl(&self) -> f64 {
        self.cumulative_pnl
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    pub fn peak_portfolio_value(&self) -> f64 {
        self.peak_portfolio_value
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// `portfolio_value = cash + sum of position.market_value` using each
    /// position's last known mark.
    pub fn portfolio_value(&self) -> f64 {
        self.cash + self.positions.values().map(|p| p.market_value).sum::<f64>()
    }

    /// Sum of absolute position market values, used by the risk gate's
    /// aggregate-exposure check.
    pub fn aggregate_exposure(&self) -> f64 {
        self.positions.values().map(|p| p.market_value.abs()).sum()
    }

    /// Refresh every held position's market_value/unrealized_pnl from the
    /// supplied last-price snapshot and return the resulting portfolio
    /// value (`spec.md` §4.8: "calculate_portfolio_value(prices) also
    /// refreshes each held position's market_value and unrealized_pnl from
    /// the supplied prices before summation").
    pub fn calculate_portfolio_value(&mut self, prices: &HashMap<String, f64>) -> f64 {
        for (symbol, position) in self.positions.iter_mut() {
            if let Some(&price) = prices.get(symbol) {
                position.market_value = position.quantity * price;
                position.unrealized_pnl = (price - position.avg_entry_price) * position.quantity;
            }
        }
        self.portfolio_value()
    }

    /// Apply an executed trade to the ledger (`spec.md` §4.8). `price` marks
    /// `symbol` for this update; other symbols keep their last known marks.
    pub fn apply_fill(
        &mut self,
        symbol: &str,
        side: Side,
        qty: f64,
        price: f64,
        commission: f64,
        timestamp_us: i64,
    ) -> FillOutcome {
        let position = self.positions.entry(symbol.to_string()).or_insert_with(Position::flat);

        let realized_pnl = match side {
            Side::Buy => {
                let old_qty = position.quantity;
                let old_avg = position.avg_entry_price;
                let new_qty = old_qty + qty;
                if new_qty != 0.0 {
                    position.avg_entry_price = (old_qty * old_avg + qty * price) / new_qty;
                }
                position.quantity = new_qty;
                self.cash -= qty * price + commission;
                0.0
            }
            Side::Sell => {
                let realized = (price - position.avg_entry_price) * qty;
                position.realized_pnl += realized;
                self.cumulative_pnl += realized;
                position.quantity -= qty;
                self.cash += qty * price - commission;
                if realized > 0.0 {
                    self.winning_trades += 1;
                }
                realized
            }
        };

        position.market_value = position.quantity * price;
        position.unrealized_pnl = (price - position.avg_entry_price) * position.quantity;
        position.last_update_us = timestamp_us;

        let portfolio_value = self.portfolio_value();
        if portfolio_value > self.peak_portfolio_value {
            self.peak_portfolio_value = portfolio_value;
        }
        if self.peak_portfolio_value > 0.0 {
            let drawdown = (self.peak_portfolio_value - portfolio_value) / self.peak_portfolio_value;
            if drawdown > self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
        self.total_trades += 1;

        FillOutcome { realized_pnl }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_pnl_matches_spec_scenario() {
        let mut portfolio = Portfolio::new(1_000_000.0);
        portfolio.apply_fill("EURUSD", Side::Buy, 1000.0, 1.1000, 0.55, 1);
        assert!((portfolio.cash() - 998_899.45).abs() < 1e-6);
        let position = portfolio.position("EURUSD").unwrap();
        assert!((position.avg_entry_price - 1.1000).abs() < 1e-9);
        assert_eq!(position.quantity, 1000.0);

        let outcome = portfolio.apply_fill("EURUSD", Side::Sell, 1000.0, 1.1050, 0.5525, 2);
        assert!((outcome.realized_pnl - 5.0).abs() < 1e-6);
        assert_eq!(portfolio.total_trades(), 2);
        assert_eq!(portfolio.winning_trades(), 1);
        assert!((portfolio.cash() - 1_000_003.8975).abs() < 1e-4);
    }

    #[test]
    fn peak_is_monotone_nondecreasing() {
        let mut portfolio = Portfolio::new(100_000.0);
        portfolio.apply_fill("AAA", Side::Buy, 100.0, 10.0, 0.0, 1);
        let first_peak = portfolio.peak_portfolio_value();
        portfolio.apply_fill("AAA", Side::Sell, 100.0, 9.0, 0.0, 2);
        assert!(portfolio.peak_portfolio_value() >= first_peak);
        assert!(portfolio.max_drawdown() >= 0.0 && portfolio.max_drawdown() <= 1.0);
    }

    #[test]
    fn selling_at_a_loss_does_not_count_as_winning() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.apply_fill("AAA", Side::Buy, 10.0, 10.0, 0.0, 1);
        portfolio.apply_fill("AAA", Side::Sell, 10.0, 9.0, 0.0, 2);
        assert_eq!(portfolio.winning_trades(), 0);
    }

    #[test]
    fn average_entry_is_volume_weighted_across_buys() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.apply_fill("AAA", Side::Buy, 10.0, 10.0, 0.0, 1);
        portfolio.apply_fill("AAA", Side::Buy, 10.0, 12.0, 0.0, 2);
        let position = portfolio.position("AAA").unwrap();
        assert!((position.avg_entry_price - 11.0).abs() < 1e-9);
    }
}
