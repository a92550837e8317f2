//! Order Builder (`spec.md` §4.5 end / §3) and the `Order` record.

use crate::core::{OrderId, OrderStatus, OrderType, Side};
use crate::signal::{Priority, Signal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: f64,
    pub limit_price: Option<f64>,
    pub created_at_us: i64,
    /// Pattern label that produced this order, carried for trade-execution
    /// provenance (`spec.md` §3 "Trade Execution... originating pattern
    /// label").
    pub signal_tag: String,
    pub risk_score: f64,
    pub execution_status: OrderStatus,
    pub filled_quantity: f64,
    pub average_fill_price: Option<f64>,
    pub commission: f64,
    /// Intake priority. Not part of the data model's field list in the
    /// distillation, but required to route orders through the priority
    /// queue described in `spec.md` §4.7/§5 — carried on the order rather
    /// than threaded separately through the execution stage.
    pub priority: Priority,
}

impl Order {
    pub fn from_signal(signal: &Signal, now_us: i64) -> Order {
        Order {
            id: OrderId::generate(),
            symbol: signal.pattern.symbol.clone(),
            side: signal.action,
            order_type: OrderType::Market,
            quantity: signal.position_size,
            limit_price: None,
            created_at_us: now_us,
            signal_tag: signal.pattern.pattern_type.to_string(),
            risk_score: signal.pattern.risk_score,
            execution_status: OrderStatus::Pending,
            filled_quantity: 0.0,
            average_fill_price: None,
            commission: 0.0,
            priority: signal.priority,
        }
    }
}

// Implement Copy-free Clone/PartialEq for Side isn't needed beyond what
// `core::types` already derives.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Pattern, PatternLabel};
    use crate::prediction::Prediction;

    fn sample_pattern() -> Pattern {
        Pattern {
            symbol: "EURUSD".to_string(),
            pattern_type: PatternLabel::VolatileUptrend,
            start_time_us: 0,
            end_time_us: 100,
            duration_ms: 0,
            fractal_dimension: 1.65,
            confidence: 0.9,
            price_range: (1.0, 1.1),
            volatility_avg: 0.03,
            pattern_strength: 0.85,
            prediction_signal: Prediction::StrongBuy,
            risk_score: 0.5,
        }
    }

    #[test]
    fn builds_market_order_pending() {
        let signal = Signal {
            pattern: sample_pattern(),
            action: crate::core::Side::Buy,
            signal_strength: 0.9,
            position_size: 1500.0,
            priority: crate::signal::Priority::High,
        };
        let order = Order::from_signal(&signal, 12345);
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.execution_status, OrderStatus::Pending);
        assert_eq!(order.quantity, 1500.0);
        assert_eq!(order.signal_tag, "VOLATILE_UPTREND");
    }
}
