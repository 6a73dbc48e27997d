use std::collections::HashMap;

use tracing::info;

use common::{Direction, MarketType, Side, SignalOptions, SignalRequest};

use crate::config::{StrategyConfig, StrategyFileConfig};
use crate::evaluator::{
    approaching_crossover, evaluate_crossover, exit_trigger, oscillator_candidate,
    SignalTracker, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD,
};
use crate::indicators::{RsiIndicator, SmaIndicator};
use crate::{Strategy, StrategyEvent, TickContext};

/// Rolling close-price window kept per strategy.
const MAX_HISTORY: usize = 200;

/// Build all strategy instances from config, exiting on unknown types.
pub fn build_strategies(
    file_cfg: &StrategyFileConfig,
    market_type: MarketType,
) -> Vec<Box<dyn Strategy>> {
    let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();

    for cfg in &file_cfg.strategies {
        let strategy = build_strategy(cfg, market_type).unwrap_or_else(|e| {
            panic!("Unknown strategy type '{}': {e}", cfg.strategy_type)
        });
        info!(name = %strategy.name(), symbol = %strategy.symbol(), "Registered strategy");
        strategies.push(strategy);
    }

    strategies
}

fn build_strategy(
    cfg: &StrategyConfig,
    market_type: MarketType,
) -> Result<Box<dyn Strategy>, String> {
    match cfg.strategy_type.as_str() {
        "sma-cross" => {
            let params = SmaCrossParams {
                fast_period: param_usize(&cfg.params, "fast", 10),
                slow_period: param_usize(&cfg.params, "slow", 30),
                tp_pct: param_f64(&cfg.params, "tp_pct", 0.025),
                sl_pct: param_f64(&cfg.params, "sl_pct", 0.015),
                leverage: param_opt_u32(&cfg.params, "leverage"),
                margin_usd: param_opt_f64(&cfg.params, "margin_usd"),
                quantity: param_opt_f64(&cfg.params, "quantity"),
            };
            Ok(Box::new(SmaCrossStrategy::new(cfg.clone(), market_type, params)))
        }
        "rsi-revert" => {
            let params = RsiRevertParams {
                period: param_usize(&cfg.params, "period", 14),
                oversold: param_f64(&cfg.params, "oversold", DEFAULT_OVERSOLD),
                overbought: param_f64(&cfg.params, "overbought", DEFAULT_OVERBOUGHT),
                tp_pct: param_f64(&cfg.params, "tp_pct", 0.02),
                sl_pct: param_f64(&cfg.params, "sl_pct", 0.02),
                quantity: param_f64(&cfg.params, "quantity", 0.1),
            };
            Ok(Box::new(RsiRevertStrategy::new(cfg.clone(), params)))
        }
        other => Err(format!("unknown type '{other}'")),
    }
}

fn param_f64(params: &HashMap<String, toml::Value>, key: &str, default: f64) -> f64 {
    params.get(key).and_then(|v| v.as_float()).unwrap_or(default)
}

fn param_usize(params: &HashMap<String, toml::Value>, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(|v| v.as_integer())
        .map(|v| v as usize)
        .unwrap_or(default)
}

fn param_opt_f64(params: &HashMap<String, toml::Value>, key: &str) -> Option<f64> {
    params.get(key).and_then(|v| v.as_float())
}

fn param_opt_u32(params: &HashMap<String, toml::Value>, key: &str) -> Option<u32> {
    params.get(key).and_then(|v| v.as_integer()).map(|v| v as u32)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ─── SMA crossover ────────────────────────────────────────────────────────────

pub struct SmaCrossParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub tp_pct: f64,
    pub sl_pct: f64,
    pub leverage: Option<u32>,
    pub margin_usd: Option<f64>,
    pub quantity: Option<f64>,
}

/// Two-SMA crossover with a pre-crossover reminder.
///
/// Emits at most one reminder per signal episode (when the gap between the
/// averages narrows under the proximity threshold) and one signal per
/// crossover. Repeated evaluations of the same side stay silent.
pub struct SmaCrossStrategy {
    cfg: StrategyConfig,
    market_type: MarketType,
    params: SmaCrossParams,
    fast: SmaIndicator,
    slow: SmaIndicator,
    closes: Vec<f64>,
    tracker: SignalTracker,
}

impl SmaCrossStrategy {
    pub fn new(cfg: StrategyConfig, market_type: MarketType, params: SmaCrossParams) -> Self {
        let fast = SmaIndicator::new(params.fast_period);
        let slow = SmaIndicator::new(params.slow_period);
        Self {
            cfg,
            market_type,
            params,
            fast,
            slow,
            closes: Vec::new(),
            tracker: SignalTracker::new(),
        }
    }

    fn leverage_note(&self) -> String {
        self.params
            .leverage
            .map(|l| format!(" (Leverage: {l}x)"))
            .unwrap_or_default()
    }

    fn reminder_message(&self, side: Side) -> String {
        match self.market_type {
            MarketType::Futures => {
                let pos = match side {
                    Side::Buy => "LONG",
                    Side::Sell => "SHORT",
                };
                format!(
                    "⚠️ Prepare for {pos} position - Fast SMA approaching crossover{}",
                    self.leverage_note()
                )
            }
            MarketType::Spot => {
                let rel = match side {
                    Side::Buy => "above",
                    Side::Sell => "below",
                };
                format!("⚠️ Prepare for {side} signal - Fast SMA approaching crossover {rel} Slow SMA")
            }
        }
    }

    fn signal_message(&self, side: Side) -> String {
        let rel = match side {
            Side::Buy => "above",
            Side::Sell => "below",
        };
        match self.market_type {
            MarketType::Futures => {
                let pos = match side {
                    Side::Buy => "LONG",
                    Side::Sell => "SHORT",
                };
                format!("{pos} signal - Fast SMA crossed {rel} Slow SMA{}", self.leverage_note())
            }
            MarketType::Spot => {
                format!("{side} signal triggered - Fast SMA crossed {rel} Slow SMA")
            }
        }
    }

    fn levels(&self, side: Side, price: f64) -> (f64, f64) {
        match side {
            Side::Buy => (
                price * (1.0 + self.params.tp_pct),
                price * (1.0 - self.params.sl_pct),
            ),
            Side::Sell => (
                price * (1.0 - self.params.tp_pct),
                price * (1.0 + self.params.sl_pct),
            ),
        }
    }

    /// Explicit quantity wins; otherwise position size is margin × leverage
    /// at the current price.
    fn quantity(&self, price: f64) -> Option<f64> {
        self.params.quantity.or_else(|| {
            match (self.params.margin_usd, self.params.leverage) {
                (Some(margin), Some(lev)) => Some(margin * f64::from(lev) / price),
                _ => None,
            }
        })
    }
}

impl Strategy for SmaCrossStrategy {
    fn name(&self) -> &str {
        &self.cfg.name
    }

    fn symbol(&self) -> &str {
        &self.cfg.symbol
    }

    fn on_tick(&mut self, ctx: &TickContext<'_>) -> Vec<StrategyEvent> {
        let tick = ctx.tick;
        let mut events = Vec::new();

        self.closes.push(tick.price);
        if self.closes.len() > MAX_HISTORY {
            self.closes.remove(0);
        }

        let (Some(fast), Some(slow)) =
            (self.fast.compute(&self.closes), self.slow.compute(&self.closes))
        else {
            return events;
        };

        let signal = evaluate_crossover(fast, slow, tick.warming_up);
        if tick.warming_up {
            return events;
        }

        // The reminder flag is consumed on proximity even when the current
        // signal is NONE and nothing goes out.
        if self.tracker.should_remind(approaching_crossover(fast, slow, tick.warming_up)) {
            if let Some(side) = signal.side() {
                events.push(StrategyEvent::Reminder {
                    symbol: tick.symbol.clone(),
                    message: self.reminder_message(side),
                });
            }
        }

        if let Some(side) = self.tracker.observe(signal) {
            let (take_profit, stop_loss) = self.levels(side, tick.price);
            events.push(StrategyEvent::Signal(SignalRequest {
                symbol: tick.symbol.clone(),
                side,
                price: tick.price,
                take_profit,
                stop_loss,
                options: SignalOptions {
                    leverage: self.params.leverage,
                    margin_usd: self.params.margin_usd,
                    quantity: self.quantity(tick.price),
                },
                message: Some(self.signal_message(side)),
            }));
        }

        events
    }
}

// ─── RSI mean reversion ───────────────────────────────────────────────────────

pub struct RsiRevertParams {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub tp_pct: f64,
    pub sl_pct: f64,
    pub quantity: f64,
}

/// Oscillator mean-reversion with an alert-then-entry flow.
///
/// A threshold breach first produces an ALERT; when the candidate direction
/// persists on the next tick the ENTRY follows. Open positions are swept
/// for TP/SL touches and produce EXIT events.
pub struct RsiRevertStrategy {
    cfg: StrategyConfig,
    params: RsiRevertParams,
    indicator: RsiIndicator,
    closes: Vec<f64>,
    /// Direction alerted on the previous tick, awaiting confirmation.
    pending: Option<Direction>,
}

impl RsiRevertStrategy {
    pub fn new(cfg: StrategyConfig, params: RsiRevertParams) -> Self {
        let indicator = RsiIndicator::new(params.period);
        Self {
            cfg,
            params,
            indicator,
            closes: Vec::new(),
            pending: None,
        }
    }

    fn levels(&self, direction: Direction, price: f64) -> (f64, f64) {
        match direction {
            Direction::Long => (
                round2(price * (1.0 + self.params.tp_pct)),
                round2(price * (1.0 - self.params.sl_pct)),
            ),
            Direction::Short => (
                round2(price * (1.0 - self.params.tp_pct)),
                round2(price * (1.0 + self.params.sl_pct)),
            ),
        }
    }

    fn alert_reason(&self, direction: Direction, rsi: f64) -> String {
        match direction {
            Direction::Long => format!("RSI Oversold ({rsi:.1}). Preparing LONG entry..."),
            Direction::Short => format!("RSI Overbought ({rsi:.1}). Preparing SHORT entry..."),
        }
    }
}

impl Strategy for RsiRevertStrategy {
    fn name(&self) -> &str {
        &self.cfg.name
    }

    fn symbol(&self) -> &str {
        &self.cfg.symbol
    }

    fn on_tick(&mut self, ctx: &TickContext<'_>) -> Vec<StrategyEvent> {
        let tick = ctx.tick;
        let mut events = Vec::new();

        self.closes.push(tick.price);
        if self.closes.len() > MAX_HISTORY {
            self.closes.remove(0);
        }

        let Some(rsi) = self.indicator.compute(&self.closes) else {
            return events;
        };
        if tick.warming_up || tick.price <= 0.0 {
            return events;
        }

        if let Some(position) = ctx.open_position {
            if let Some(trigger) = exit_trigger(position, tick.price) {
                events.push(StrategyEvent::Exit {
                    symbol: tick.symbol.clone(),
                    price: tick.price,
                    reason: trigger.reason().to_string(),
                });
            }
            self.pending = None;
            return events;
        }

        match oscillator_candidate(rsi, self.params.oversold, self.params.overbought) {
            Some(direction) => {
                let (take_profit, stop_loss) = self.levels(direction, tick.price);
                if self.pending == Some(direction) {
                    events.push(StrategyEvent::Entry {
                        direction,
                        symbol: tick.symbol.clone(),
                        price: tick.price,
                        quantity: self.params.quantity,
                        take_profit,
                        stop_loss,
                    });
                    self.pending = None;
                } else {
                    events.push(StrategyEvent::Alert {
                        direction,
                        symbol: tick.symbol.clone(),
                        price: tick.price,
                        take_profit,
                        stop_loss,
                        reason: self.alert_reason(direction, rsi),
                    });
                    self.pending = Some(direction);
                }
            }
            None => self.pending = None,
        }

        events
    }
}
