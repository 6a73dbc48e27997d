use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Market segment the strategy trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketType {
    Spot,
    Futures,
}

impl std::str::FromStr for MarketType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_uppercase().as_str() {
            "SPOT" => Ok(MarketType::Spot),
            "FUTURES" => Ok(MarketType::Futures),
            other => Err(Error::Config(format!(
                "market type must be 'SPOT' or 'FUTURES', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketType::Spot => write!(f, "SPOT"),
            MarketType::Futures => write!(f, "FUTURES"),
        }
    }
}

/// Three-state output of the crossover evaluator.
///
/// `None` is the resting state: it never produces a notification and never
/// overwrites the last emitted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    #[default]
    None,
    Buy,
    Sell,
}

impl Signal {
    /// The tradeable side of this signal, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Signal::None => None,
            Signal::Buy => Some(Side::Buy),
            Signal::Sell => Some(Side::Sell),
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::None => write!(f, "NONE"),
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
        }
    }
}

/// Side of a trade signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// One market data update delivered by the host feed.
///
/// `warming_up` is set by the host while indicators have insufficient
/// history; strategies must stay silent for those ticks.
#[derive(Debug, Clone)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    pub warming_up: bool,
}

/// An open position recorded when an ENTRY notification fires.
/// At most one per symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub quantity: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Realized profit and loss when closing at `exit_price`.
    pub fn realized_pnl(&self, exit_price: f64) -> f64 {
        match self.direction {
            Direction::Long => (exit_price - self.entry_price) * self.quantity,
            Direction::Short => (self.entry_price - exit_price) * self.quantity,
        }
    }
}

/// Optional sizing fields for a signal notification. Absent fields are
/// omitted from the payload, never sent as null.
#[derive(Debug, Clone, Default)]
pub struct SignalOptions {
    pub leverage: Option<u32>,
    pub margin_usd: Option<f64>,
    pub quantity: Option<f64>,
}

/// A fully specified signal notification request.
#[derive(Debug, Clone)]
pub struct SignalRequest {
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub options: SignalOptions,
    /// Falls back to "`<side>` signal triggered - `<strategy name>`".
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_pnl_is_exit_minus_entry_times_quantity() {
        let pos = Position {
            symbol: "BTCUSD".into(),
            direction: Direction::Long,
            entry_price: 100.0,
            quantity: 0.1,
            take_profit: 110.0,
            stop_loss: 95.0,
            opened_at: Utc::now(),
        };
        assert!((pos.realized_pnl(110.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn short_pnl_is_entry_minus_exit_times_quantity() {
        let pos = Position {
            symbol: "BTCUSD".into(),
            direction: Direction::Short,
            entry_price: 100.0,
            quantity: 0.1,
            take_profit: 90.0,
            stop_loss: 105.0,
            opened_at: Utc::now(),
        };
        assert!((pos.realized_pnl(90.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn market_type_parses_case_insensitively() {
        assert_eq!("spot".parse::<MarketType>().unwrap(), MarketType::Spot);
        assert_eq!("FUTURES".parse::<MarketType>().unwrap(), MarketType::Futures);
        assert!("margin".parse::<MarketType>().is_err());
    }
}
