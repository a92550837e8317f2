//! Synthetic tick generator.
//!
//! `spec.md` Non-goals exclude a real market-data feed (Kafka/exchange
//! connectivity). Grounded on `bog-bins`'s `create_test_feed`: a closure
//! that advances a tick counter and synthesizes a price series with
//! sinusoidal movement plus noise, standing in for the live feed.

use fractal_core::TickWire;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Per-symbol synthetic tick source: sinusoidal drift plus Gaussian noise,
/// with volatility derived from the local price change.
pub struct TickGenerator {
    symbol: String,
    sequence_id: i64,
    base_price: f32,
    tick_index: u64,
    start_time_us: i64,
    noise: Normal<f32>,
    last_price: f32,
}

impl TickGenerator {
    pub fn new(symbol: &str, base_price: f32, start_time_us: i64) -> Self {
        Self {
            symbol: symbol.to_string(),
            sequence_id: 0,
            base_price,
            tick_index: 0,
            start_time_us,
            noise: Normal::new(0.0, base_price * 0.0005).expect("valid normal parameters"),
            last_price: base_price,
        }
    }

    /// Advance the generator by one tick (`spec.md` §2's tick interval is
    /// caller-defined; here, 100 microseconds per tick).
    pub fn next_tick(&mut self, rng: &mut impl Rng) -> TickWire {
        self.tick_index += 1;
        self.sequence_id += 1;

        let drift = (self.tick_index as f32 * 0.05).sin() * (self.base_price * 0.001);
        let noise = self.noise.sample(rng);
        let price = (self.base_price + drift + noise).max(0.0001);
        let volatility = ((price - self.last_price) / self.last_price).abs();
        self.last_price = price;

        let spread = price * 0.0001;
        let timestamp_us = self.start_time_us + (self.tick_index as i64 * 100);

        TickWire {
            timestamp_us,
            symbol: self.symbol.clone(),
            price,
            volume: 100 + (self.tick_index % 50) as i32,
            bid: price - spread / 2.0,
            ask: price + spread / 2.0,
            spread,
            volatility,
            fractal_dimension: 1.5,
            sequence_id: self.sequence_id,
            exchange: "SIM".to_string(),
        }
    }
}

pub fn now_us() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_micros() as i64
}
