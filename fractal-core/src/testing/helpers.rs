//! Test helper builders for ticks, orders, and portfolios.
//!
//! Grounded on the teacher's builder-function style
//! (`create_test_snapshot`, `create_test_position`, etc. in
//! `bog-core/src/testing/helpers.rs`), re-themed to this pipeline's types.

use crate::core::{OrderId, OrderStatus, OrderType, Side};
use crate::order::Order;
use crate::portfolio::Portfolio;
use crate::signal::Priority;
use crate::tick::TickWire;

/// A plausible tick for `symbol` at `price`, with the rest of the fields
/// filled with reasonable constants.
pub fn test_tick(symbol: &str, timestamp_us: i64, price: f32, volatility: f32) -> TickWire {
    TickWire {
        timestamp_us,
        symbol: symbol.to_string(),
        price,
        volume: 100,
        bid: price - 0.0001,
        ask: price + 0.0001,
        spread: 0.0002,
        volatility,
        fractal_dimension: 1.5,
        sequence_id: timestamp_us,
        exchange: "SIM".to_string(),
    }
}

/// A pending MARKET order for `symbol`/`side`/`quantity`, bypassing the
/// signal pipeline for risk-gate and execution-engine unit tests.
pub fn market_order(symbol: &str, side: Side, quantity: f64) -> Order {
    Order {
        id: OrderId::generate(),
        symbol: symbol.to_string(),
        side,
        order_type: OrderType::Market,
        quantity,
        limit_price: None,
        created_at_us: 0,
        signal_tag: "TEST".to_string(),
        risk_score: 0.0,
        execution_status: OrderStatus::Pending,
        filled_quantity: 0.0,
        average_fill_price: None,
        commission: 0.0,
        priority: Priority::Medium,
    }
}

/// A flat portfolio with `cash` and no positions.
pub fn test_portfolio(cash: f64) -> Portfolio {
    Portfolio::new(cash)
}
