use chrono::{DateTime, Duration, Utc};

use common::Tick;

/// Deterministic one-minute bar source for replay runs.
///
/// Prices trace a slow sine wave around a base level, which is enough to
/// carry a moving-average pair through repeated crossovers. The first
/// `warmup_bars` ticks are flagged as warm-up.
pub struct SyntheticFeed {
    symbol: String,
    base_price: f64,
    amplitude: f64,
    warmup_bars: usize,
    start: DateTime<Utc>,
    bar: usize,
}

impl SyntheticFeed {
    pub fn new(
        symbol: impl Into<String>,
        base_price: f64,
        amplitude: f64,
        warmup_bars: usize,
        start: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            base_price,
            amplitude,
            warmup_bars,
            start,
            bar: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn next_tick(&mut self) -> Tick {
        let i = self.bar as f64;
        let price = self.base_price * (1.0 + self.amplitude * (i / 20.0).sin());
        let tick = Tick {
            symbol: self.symbol.clone(),
            price,
            timestamp: self.start + Duration::minutes(self.bar as i64),
            warming_up: self.bar < self.warmup_bars,
        };
        self.bar += 1;
        tick
    }
}
