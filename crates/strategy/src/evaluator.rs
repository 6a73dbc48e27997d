use common::{Direction, Position, Side, Signal};

/// Gap threshold (percent) under which the two moving averages count as
/// approaching a crossover.
pub const PROXIMITY_THRESHOLD_PCT: f64 = 0.5;

/// Default oscillator thresholds.
pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

/// Three-state crossover signal from a fast and slow moving average.
/// Always `None` while the host is warming up.
pub fn evaluate_crossover(fast: f64, slow: f64, warming_up: bool) -> Signal {
    if warming_up {
        return Signal::None;
    }
    if fast > slow {
        Signal::Buy
    } else if fast < slow {
        Signal::Sell
    } else {
        Signal::None
    }
}

/// Percentage-gap proximity check between the two averages.
/// False unconditionally during warm-up.
///
/// Divides by `slow`: callers must not pass a zero slow average.
pub fn approaching_crossover(fast: f64, slow: f64, warming_up: bool) -> bool {
    if warming_up {
        return false;
    }
    (fast - slow).abs() / slow * 100.0 < PROXIMITY_THRESHOLD_PCT
}

/// Entry candidate from a single oscillator value: below `oversold` the
/// market is a LONG candidate, above `overbought` a SHORT candidate.
pub fn oscillator_candidate(value: f64, oversold: f64, overbought: f64) -> Option<Direction> {
    if value < oversold {
        Some(Direction::Long)
    } else if value > overbought {
        Some(Direction::Short)
    } else {
        None
    }
}

/// Why an open position should be closed at the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    TakeProfit,
    StopLoss,
}

impl ExitTrigger {
    pub fn reason(self) -> &'static str {
        match self {
            ExitTrigger::TakeProfit => "Take Profit Hit!",
            ExitTrigger::StopLoss => "Stop Loss Hit!",
        }
    }
}

/// TP/SL touch check for an open position. Take-profit wins when both
/// levels are touched within the same bar.
pub fn exit_trigger(position: &Position, price: f64) -> Option<ExitTrigger> {
    match position.direction {
        Direction::Long => {
            if price >= position.take_profit {
                Some(ExitTrigger::TakeProfit)
            } else if price <= position.stop_loss {
                Some(ExitTrigger::StopLoss)
            } else {
                None
            }
        }
        Direction::Short => {
            if price <= position.take_profit {
                Some(ExitTrigger::TakeProfit)
            } else if price >= position.stop_loss {
                Some(ExitTrigger::StopLoss)
            } else {
                None
            }
        }
    }
}

/// Per-strategy signal episode state: the last emitted signal and whether
/// the pre-crossover reminder was already spent for the current episode.
///
/// An episode is the interval between two consecutive distinct non-`None`
/// emissions; at most one reminder fires within it.
#[derive(Debug, Clone, Default)]
pub struct SignalTracker {
    last_signal: Signal,
    reminder_sent: bool,
}

impl SignalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_signal(&self) -> Signal {
        self.last_signal
    }

    pub fn reminder_sent(&self) -> bool {
        self.reminder_sent
    }

    /// Record the latest evaluation. Returns the side to notify when the
    /// signal differs from the last emitted one and is not `None`.
    /// An emission starts a new episode: the reminder flag is cleared.
    pub fn observe(&mut self, signal: Signal) -> Option<Side> {
        if signal == self.last_signal || signal == Signal::None {
            return None;
        }
        self.last_signal = signal;
        self.reminder_sent = false;
        signal.side()
    }

    /// True the first time the proximity predicate holds within the current
    /// episode. The flag is consumed even when the caller ends up not
    /// sending anything for it.
    pub fn should_remind(&mut self, approaching: bool) -> bool {
        if approaching && !self.reminder_sent {
            self.reminder_sent = true;
            true
        } else {
            false
        }
    }
}
