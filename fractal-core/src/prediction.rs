//! Prediction Mapping (`spec.md` §4.4): pattern label + strength -> a
//! directional prediction label from a closed vocabulary.

use crate::pattern::PatternLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prediction {
    Buy,
    Sell,
    Hold,
    Neutral,
    Avoid,
    StrongBuy,
    StrongSell,
    WeakBuy,
    WeakSell,
    WeakHold,
    WeakAvoid,
}

impl Prediction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Prediction::Buy => "BUY",
            Prediction::Sell => "SELL",
            Prediction::Hold => "HOLD",
            Prediction::Neutral => "NEUTRAL",
            Prediction::Avoid => "AVOID",
            Prediction::StrongBuy => "STRONG_BUY",
            Prediction::StrongSell => "STRONG_SELL",
            Prediction::WeakBuy => "WEAK_BUY",
            Prediction::WeakSell => "WEAK_SELL",
            Prediction::WeakHold => "WEAK_HOLD",
            Prediction::WeakAvoid => "WEAK_AVOID",
        }
    }

    /// Whether this prediction produces a BUY/SELL order (`spec.md` §4.5:
    /// "Only BUY/STRONG_BUY/SELL/STRONG_SELL become orders"). Note WEAK_BUY
    /// and WEAK_SELL are excluded — only full-strength and strong-strength
    /// directional predictions are tradeable.
    pub const fn directional_action(&self) -> Option<crate::core::Side> {
        match self {
            Prediction::Buy | Prediction::StrongBuy => Some(crate::core::Side::Buy),
            Prediction::Sell | Prediction::StrongSell => Some(crate::core::Side::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    Buy,
    Sell,
    Hold,
    Neutral,
    Avoid,
}

fn base_prediction(label: PatternLabel, fd: f64) -> Base {
    match label {
        PatternLabel::VolatileUptrend => Base::Buy,
        PatternLabel::VolatileBreakout => {
            if fd > 1.7 {
                Base::Buy
            } else {
                Base::Neutral
            }
        }
        PatternLabel::VolatileDowntrend => Base::Sell,
        PatternLabel::SmoothTrend | PatternLabel::TrendingFractal => Base::Hold,
        PatternLabel::VolatileRange => Base::Neutral,
        PatternLabel::Choppy => Base::Avoid,
        _ => Base::Neutral,
    }
}

/// Apply the strength-based STRONG_/WEAK_ prefixing rules on top of the base
/// prediction (`spec.md` §4.4).
pub fn predict(label: PatternLabel, strength: f64, fd: f64) -> Prediction {
    let base = base_prediction(label, fd);

    if strength < 0.3 {
        return Prediction::Neutral;
    }
    if strength > 0.8 {
        match base {
            Base::Buy => return Prediction::StrongBuy,
            Base::Sell => return Prediction::StrongSell,
            _ => {}
        }
    }
    if strength < 0.4 && base != Base::Neutral {
        return match base {
            Base::Buy => Prediction::WeakBuy,
            Base::Sell => Prediction::WeakSell,
            Base::Hold => Prediction::WeakHold,
            Base::Avoid => Prediction::WeakAvoid,
            Base::Neutral => unreachable!(),
        };
    }

    match base {
        Base::Buy => Prediction::Buy,
        Base::Sell => Prediction::Sell,
        Base::Hold => Prediction::Hold,
        Base::Neutral => Prediction::Neutral,
        Base::Avoid => Prediction::Avoid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_strength_always_neutral() {
        assert_eq!(predict(PatternLabel::VolatileUptrend, 0.1, 1.65), Prediction::Neutral);
    }

    #[test]
    fn high_strength_strong_buy() {
        assert_eq!(predict(PatternLabel::VolatileUptrend, 0.9, 1.65), Prediction::StrongBuy);
    }

    #[test]
    fn mid_low_strength_weak_prefix() {
        assert_eq!(predict(PatternLabel::VolatileDowntrend, 0.35, 1.65), Prediction::WeakSell);
    }

    #[test]
    fn mid_strength_unmodified() {
        assert_eq!(predict(PatternLabel::VolatileUptrend, 0.5, 1.65), Prediction::Buy);
    }

    #[test]
    fn choppy_avoid_path() {
        assert_eq!(predict(PatternLabel::Choppy, 0.5, 1.9), Prediction::Avoid);
    }

    #[test]
    fn weak_buy_is_not_directional() {
        assert_eq!(Prediction::WeakBuy.directional_action(), None);
        assert_eq!(Prediction::StrongBuy.directional_action(), Some(crate::core::Side::Buy));
    }

    #[test]
    fn volatile_breakout_needs_high_fd_for_buy() {
        assert_eq!(base_prediction(PatternLabel::VolatileBreakout, 1.75), Base::Buy);
        assert_eq!(base_prediction(PatternLabel::VolatileBreakout, 1.65), Base::Neutral);
    }
}
