//! Signal Processor (`spec.md` §4.5).

use crate::core::Side;
use crate::pattern::{Pattern, PatternLabel};
use crate::prediction::Prediction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

const HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
}

/// An accepted pattern turned into an actionable directive.
#[derive(Debug, Clone)]
pub struct Signal {
    pub pattern: Pattern,
    pub action: Side,
    pub signal_strength: f64,
    pub position_size: f64,
    pub priority: Priority,
}

fn pattern_multiplier(label: PatternLabel) -> f64 {
    match label {
        PatternLabel::VolatileBreakout => 1.20,
        PatternLabel::VolatileUptrend | PatternLabel::VolatileDowntrend => 1.10,
        PatternLabel::TrendingFractal => 1.05,
        PatternLabel::SmoothTrend => 0.90,
        PatternLabel::VolatileRange => 0.80,
        PatternLabel::Choppy => 0.60,
        _ => 1.00,
    }
}

fn prediction_multiplier(prediction: Prediction) -> f64 {
    match prediction {
        Prediction::StrongBuy | Prediction::StrongSell => 1.30,
        Prediction::Buy | Prediction::Sell => 1.10,
        Prediction::Hold => 0.70,
        Prediction::Neutral => 0.50,
        Prediction::Avoid => 0.20,
        _ => 1.00,
    }
}

/// Filters patterns by confidence/risk, computes signal strength and
/// position size, and retains a rolling history per symbol for
/// introspection (`spec.md` §4.5, ring size 100 per the original
/// implementation's per-symbol `deque(maxlen=100)`).
pub struct SignalProcessor {
    history: HashMap<String, VecDeque<Signal>>,
}

impl SignalProcessor {
    pub fn new() -> Self {
        Self { history: HashMap::new() }
    }

    /// Evaluate a candidate pattern, returning an accepted `Signal` or
    /// `None` if it is rejected by the confidence/risk gate or does not map
    /// to a directional prediction.
    pub fn process(&mut self, pattern: Pattern) -> Option<Signal> {
        if pattern.confidence < 0.7 || pattern.risk_score > 1.5 {
            return None;
        }

        let action = pattern.prediction_signal.directional_action()?;

        let risk_penalty = (pattern.risk_score * 0.15).min(0.3);
        let signal_strength = (pattern.confidence
            * pattern_multiplier(pattern.pattern_type)
            * prediction_multiplier(pattern.prediction_signal)
            - risk_penalty)
            .clamp(0.0, 1.0);

        let position_size = (1000.0
            * (0.5 + signal_strength * 1.5)
            * (1.0 - pattern.risk_score * 0.3).max(0.2))
        .clamp(100.0, 10_000.0);

        let priority = if signal_strength > 0.8 { Priority::High } else { Priority::Medium };

        let signal = Signal { pattern: pattern.clone(), action, signal_strength, position_size, priority };

        let entry = self.history.entry(pattern.symbol.clone()).or_insert_with(VecDeque::new);
        entry.push_back(signal.clone());
        if entry.len() > HISTORY_CAPACITY {
            entry.pop_front();
        }

        Some(signal)
    }

    pub fn history_for(&self, symbol: &str) -> &[Signal] {
        self.history.get(symbol).map(|d| d.as_slices().0).unwrap_or(&[])
    }
}

impl Default for SignalProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowSnapshot;

    fn pattern_with(confidence_prices: Vec<f64>, vols: Vec<f64>) -> Pattern {
        let n = confidence_prices.len();
        let snapshot = WindowSnapshot {
            window_size: n,
            start_time_us: 0,
            end_time_us: (n as i64) - 1,
            prices: confidence_prices,
            volatilities: vols,
        };
        Pattern::detect("EURUSD", &snapshot)
    }

    #[test]
    fn flat_series_rejected_low_confidence() {
        let pattern = pattern_with(vec![1.0; 50], vec![0.0; 50]);
        let mut proc = SignalProcessor::new();
        assert!(proc.process(pattern).is_none());
    }

    #[test]
    fn signal_strength_and_position_size_in_bounds() {
        // Construct a trending, moderately volatile series likely to clear
        // the confidence/risk gate and produce a directional prediction.
        let n = 60;
        let mut prices = Vec::with_capacity(n);
        let mut p = 1.0;
        for i in 0..n {
            p += 0.002 + (i as f64 * 0.1).sin() * 0.0005;
            prices.push(p);
        }
        let vols = vec![0.025; n];
        let pattern = pattern_with(prices, vols);
        let mut proc = SignalProcessor::new();
        if let Some(signal) = proc.process(pattern) {
            assert!((0.0..=1.0).contains(&signal.signal_strength));
            assert!((100.0..=10_000.0).contains(&signal.position_size));
        }
    }

    #[test]
    fn history_capped_at_100() {
        let mut proc = SignalProcessor::new();
        for _ in 0..150 {
            let n = 60;
            let prices: Vec<f64> = (0..n).map(|i| 1.0 + i as f64 * 0.003).collect();
            let vols = vec![0.03; n];
            let pattern = pattern_with(prices, vols);
            proc.process(pattern);
        }
        assert!(proc.history_for("EURUSD").len() <= 100);
    }
}
