//! Pattern Classifier (`spec.md` §4.3) and the `Pattern` record (`spec.md` §3).

use crate::fractal;
use crate::prediction::{self, Prediction};
use crate::window::WindowSnapshot;
use serde::{Deserialize, Serialize};

/// Closed vocabulary of pattern labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternLabel {
    SmoothTrend,
    Sideways,
    VolatileBreakout,
    Choppy,
    VolatileUptrend,
    VolatileDowntrend,
    VolatileRange,
    TrendingFractal,
    RangeFractal,
    NormalMovement,
}

impl PatternLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PatternLabel::SmoothTrend => "SMOOTH_TREND",
            PatternLabel::Sideways => "SIDEWAYS",
            PatternLabel::VolatileBreakout => "VOLATILE_BREAKOUT",
            PatternLabel::Choppy => "CHOPPY",
            PatternLabel::VolatileUptrend => "VOLATILE_UPTREND",
            PatternLabel::VolatileDowntrend => "VOLATILE_DOWNTREND",
            PatternLabel::VolatileRange => "VOLATILE_RANGE",
            PatternLabel::TrendingFractal => "TRENDING_FRACTAL",
            PatternLabel::RangeFractal => "RANGE_FRACTAL",
            PatternLabel::NormalMovement => "NORMAL_MOVEMENT",
        }
    }
}

impl std::fmt::Display for PatternLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sum of the last `min(10, N-1)` simple returns.
fn trend(prices: &[f64]) -> f64 {
    let n = prices.len();
    if n < 2 {
        return 0.0;
    }
    let lookback = (n - 1).min(10);
    let mut sum = 0.0;
    for i in (n - lookback)..n {
        sum += (prices[i] - prices[i - 1]) / prices[i - 1];
    }
    sum
}

/// First-match-wins decision ladder (`spec.md` §4.3).
pub fn classify(fd: f64, prices: &[f64], volatilities: &[f64]) -> PatternLabel {
    let t = trend(prices);
    let avg_vol = volatilities.iter().sum::<f64>() / volatilities.len() as f64;

    if fd < 1.2 && t.abs() > 0.01 {
        PatternLabel::SmoothTrend
    } else if fd < 1.2 {
        PatternLabel::Sideways
    } else if fd > 1.8 && avg_vol > 0.05 {
        PatternLabel::VolatileBreakout
    } else if fd > 1.8 {
        PatternLabel::Choppy
    } else if fd > 1.6 && t > 0.02 {
        PatternLabel::VolatileUptrend
    } else if fd > 1.6 && t < -0.02 {
        PatternLabel::VolatileDowntrend
    } else if fd > 1.6 {
        PatternLabel::VolatileRange
    } else if fd > 1.4 && t.abs() > 0.015 {
        PatternLabel::TrendingFractal
    } else if fd > 1.4 {
        PatternLabel::RangeFractal
    } else {
        PatternLabel::NormalMovement
    }
}

/// A labeled window summary (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub symbol: String,
    pub pattern_type: PatternLabel,
    pub start_time_us: i64,
    pub end_time_us: i64,
    pub duration_ms: i64,
    pub fractal_dimension: f64,
    pub confidence: f64,
    pub price_range: (f64, f64),
    pub volatility_avg: f64,
    pub pattern_strength: f64,
    pub prediction_signal: Prediction,
    pub risk_score: f64,
}

impl Pattern {
    /// Run the feature kernel and classifier over a full window and produce
    /// a `Pattern` record, including the prediction-signal mapping
    /// (`spec.md` §4.4) since `Pattern` carries `prediction_signal`.
    pub fn detect(symbol: &str, snapshot: &WindowSnapshot) -> Pattern {
        let fd = fractal::fractal_dimension(&snapshot.prices);
        let confidence = fractal::confidence(fd, &snapshot.prices, &snapshot.volatilities);
        let strength = fractal::pattern_strength(&snapshot.prices, &snapshot.volatilities);
        let risk = fractal::risk_score(fd, &snapshot.volatilities);
        let label = classify(fd, &snapshot.prices, &snapshot.volatilities);
        let prediction = prediction::predict(label, strength, fd);

        let min_p = snapshot.prices.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_p = snapshot.prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let volatility_avg = snapshot.volatilities.iter().sum::<f64>() / snapshot.volatilities.len() as f64;

        Pattern {
            symbol: symbol.to_string(),
            pattern_type: label,
            start_time_us: snapshot.start_time_us,
            end_time_us: snapshot.end_time_us,
            duration_ms: (snapshot.end_time_us - snapshot.start_time_us) / 1_000,
            fractal_dimension: fd,
            confidence,
            price_range: (min_p, max_p),
            volatility_avg,
            pattern_strength: strength,
            prediction_signal: prediction,
            risk_score: risk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_confidence_below_gate() {
        let prices = vec![1.0; 50];
        let vols = vec![0.0; 50];
        let snapshot = WindowSnapshot {
            window_size: 50,
            start_time_us: 0,
            end_time_us: 49,
            prices,
            volatilities: vols,
        };
        let pattern = Pattern::detect("EURUSD", &snapshot);
        assert_eq!(pattern.fractal_dimension, 1.0);
        assert!(pattern.confidence < 0.7);
    }

    #[test]
    fn classify_sideways_on_low_fd_no_trend() {
        let prices = vec![1.0; 30];
        let vols = vec![0.01; 30];
        assert_eq!(classify(1.0, &prices, &vols), PatternLabel::Sideways);
    }

    #[test]
    fn classify_choppy_on_high_fd_low_vol() {
        let prices = vec![1.0; 30];
        let vols = vec![0.01; 30];
        assert_eq!(classify(1.9, &prices, &vols), PatternLabel::Choppy);
    }

    #[test]
    fn classify_volatile_breakout_on_high_fd_high_vol() {
        let prices = vec![1.0; 30];
        let vols = vec![0.06; 30];
        assert_eq!(classify(1.9, &prices, &vols), PatternLabel::VolatileBreakout);
    }

    #[test]
    fn classify_normal_movement_default() {
        let prices = vec![1.0; 30];
        let vols = vec![0.01; 30];
        assert_eq!(classify(1.3, &prices, &vols), PatternLabel::NormalMovement);
    }
}
