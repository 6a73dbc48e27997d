pub mod config;
pub mod evaluator;
pub mod indicators;
pub mod strategies;

pub use config::{StrategyConfig, StrategyFileConfig};
pub use evaluator::SignalTracker;
pub use strategies::build_strategies;

use common::{Direction, Position, SignalRequest, Tick};

/// All strategy implementations must satisfy this trait.
pub trait Strategy: Send {
    /// Human-readable name of this strategy instance.
    fn name(&self) -> &str;

    /// The symbol this strategy watches (e.g. "BTCUSDT").
    fn symbol(&self) -> &str;

    /// Evaluate one tick and return the notifications it warrants.
    /// Returns an empty vector for the common no-op tick.
    fn on_tick(&mut self, ctx: &TickContext<'_>) -> Vec<StrategyEvent>;
}

/// Everything a strategy may consult for one tick. Built fresh per tick by
/// the tick loop; strategies never hold references into it.
#[derive(Debug)]
pub struct TickContext<'a> {
    pub tick: &'a Tick,
    /// The currently open position for the tick's symbol, if any.
    pub open_position: Option<&'a Position>,
}

/// A notification produced by a strategy, dispatched by the tick loop.
#[derive(Debug, Clone)]
pub enum StrategyEvent {
    /// Pre-crossover heads-up, at most one per signal episode.
    Reminder { symbol: String, message: String },
    /// Crossover signal with TP/SL and optional sizing.
    Signal(SignalRequest),
    /// Heads-up before an entry (single-path webhook variant).
    Alert {
        direction: Direction,
        symbol: String,
        price: f64,
        take_profit: f64,
        stop_loss: f64,
        reason: String,
    },
    /// Position entry; the dispatcher records the position.
    Entry {
        direction: Direction,
        symbol: String,
        price: f64,
        quantity: f64,
        take_profit: f64,
        stop_loss: f64,
    },
    /// Position exit; requires a recorded position for the symbol.
    Exit {
        symbol: String,
        price: f64,
        reason: String,
    },
}
