//! Market tick: the immutable unit of input to the pipeline (`spec.md` §3/§6).

use serde::{Deserialize, Serialize};

/// Wire representation matching `spec.md` §6's tick input JSON exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickWire {
    pub timestamp_us: i64,
    pub symbol: String,
    pub price: f32,
    pub volume: i32,
    pub bid: f32,
    pub ask: f32,
    pub spread: f32,
    pub volatility: f32,
    pub fractal_dimension: f32,
    pub sequence_id: i64,
    pub exchange: String,
}

impl TickWire {
    /// Validate the fields a malformed-but-parseable tick can still violate:
    /// non-finite price/volatility, empty symbol.
    pub fn validate(&self) -> Result<(), crate::core::IngestError> {
        use crate::core::IngestError;

        if self.symbol.is_empty() {
            return Err(IngestError::InvalidField {
                field: "symbol",
                reason: "empty symbol".to_string(),
            });
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(IngestError::InvalidField {
                field: "price",
                reason: format!("non-finite or non-positive price: {}", self.price),
            });
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(IngestError::InvalidField {
                field: "volatility",
                reason: format!("non-finite or negative volatility: {}", self.volatility),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TickWire {
        TickWire {
            timestamp_us: 1,
            symbol: "EURUSD".to_string(),
            price: 1.1,
            volume: 100,
            bid: 1.0999,
            ask: 1.1001,
            spread: 0.0002,
            volatility: 0.01,
            fractal_dimension: 1.5,
            sequence_id: 1,
            exchange: "SIM".to_string(),
        }
    }

    #[test]
    fn valid_tick_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn non_finite_price_rejected() {
        let mut t = sample();
        t.price = f32::NAN;
        assert!(t.validate().is_err());
    }

    #[test]
    fn empty_symbol_rejected() {
        let mut t = sample();
        t.symbol.clear();
        assert!(t.validate().is_err());
    }

    #[test]
    fn json_round_trip() {
        let t = sample();
        let json = serde_json::to_string(&t).unwrap();
        let back: TickWire = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
