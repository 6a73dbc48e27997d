use tracing::{debug, info};

use common::Tick;
use notifier::{Notifier, SignalManager};
use strategy::{Strategy, StrategyEvent, TickContext};

use crate::feed::SyntheticFeed;

/// Drives the feeds through every strategy and routes the resulting events
/// to the two dispatchers.
///
/// Deliveries are awaited inline: a tick is not finished until its webhooks
/// have been attempted, so events always arrive in market order.
pub struct TickLoop {
    strategies: Vec<Box<dyn Strategy>>,
    feeds: Vec<SyntheticFeed>,
    notifier: Notifier,
    manager: SignalManager,
    heartbeat_every: u64,
    ticks_seen: u64,
}

impl TickLoop {
    pub fn new(
        strategies: Vec<Box<dyn Strategy>>,
        feeds: Vec<SyntheticFeed>,
        notifier: Notifier,
        manager: SignalManager,
        heartbeat_every: u64,
    ) -> Self {
        Self {
            strategies,
            feeds,
            notifier,
            manager,
            heartbeat_every: heartbeat_every.max(1),
            ticks_seen: 0,
        }
    }

    pub fn ticks_seen(&self) -> u64 {
        self.ticks_seen
    }

    /// Replay `bars` rounds, one tick per feed per round.
    pub async fn run(&mut self, bars: usize) {
        info!(bars, feeds = self.feeds.len(), "Replay started");
        for _ in 0..bars {
            let ticks: Vec<Tick> = self.feeds.iter_mut().map(|f| f.next_tick()).collect();
            for tick in &ticks {
                self.step(tick).await;
            }
        }
        info!(ticks = self.ticks_seen, "Replay finished");
    }

    async fn step(&mut self, tick: &Tick) {
        self.ticks_seen += 1;

        // first live tick flips the notifier from dormant to active
        if !tick.warming_up && !self.notifier.is_enabled() {
            self.notifier.enable(tick.timestamp);
        }

        let mut events = Vec::new();
        for strat in self
            .strategies
            .iter_mut()
            .filter(|s| s.symbol() == tick.symbol)
        {
            let open_position = self.manager.position(&tick.symbol).cloned();
            let ctx = TickContext {
                tick,
                open_position: open_position.as_ref(),
            };
            events.extend(strat.on_tick(&ctx));
        }

        for event in events {
            self.dispatch(event, tick).await;
        }

        if self.ticks_seen % self.heartbeat_every == 0 {
            self.notifier.heartbeat(&format!(
                "Strategy running - {} ticks processed",
                self.ticks_seen
            ));
        }
    }

    async fn dispatch(&mut self, event: StrategyEvent, tick: &Tick) {
        match event {
            StrategyEvent::Reminder { symbol, message } => {
                self.notifier
                    .send_reminder(&symbol, &message, tick.timestamp)
                    .await;
            }
            StrategyEvent::Signal(req) => {
                self.notifier.send_signal(&req, tick.timestamp).await;
            }
            StrategyEvent::Alert {
                direction,
                symbol,
                price,
                take_profit,
                stop_loss,
                reason,
            } => {
                if self.manager.recently_alerted(&symbol, tick.timestamp) {
                    debug!(%symbol, "Alert suppressed by throttle window");
                    return;
                }
                self.manager
                    .send_alert(
                        direction,
                        &symbol,
                        price,
                        take_profit,
                        stop_loss,
                        &reason,
                        tick.timestamp,
                    )
                    .await;
            }
            StrategyEvent::Entry {
                direction,
                symbol,
                price,
                quantity,
                take_profit,
                stop_loss,
            } => {
                self.manager
                    .send_entry(
                        direction,
                        &symbol,
                        price,
                        quantity,
                        take_profit,
                        stop_loss,
                        tick.timestamp,
                    )
                    .await;
            }
            StrategyEvent::Exit {
                symbol,
                price,
                reason,
            } => {
                self.manager
                    .send_exit(&symbol, price, &reason, tick.timestamp)
                    .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use common::{MarketType, Result, WebhookTransport};
    use strategy::{build_strategies, StrategyFileConfig};

    struct RecordingTransport {
        requests: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WebhookTransport for RecordingTransport {
        async fn post_json(&self, url: &str, body: String) -> Result<()> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), body));
            Ok(())
        }
    }

    fn sma_cross_strategies() -> Vec<Box<dyn Strategy>> {
        let cfg: StrategyFileConfig = toml::from_str(
            r#"
            [[strategy]]
            type = "sma-cross"
            name = "SPOT SMA Crossover Strategy"
            symbol = "BTCUSDT"

            [strategy.params]
            fast = 10
            slow = 30
            "#,
        )
        .unwrap();
        build_strategies(&cfg, MarketType::Spot)
    }

    fn tick_loop(transport: Arc<RecordingTransport>) -> TickLoop {
        let start = "2026-01-01T00:00:00Z".parse().unwrap();
        let feed = SyntheticFeed::new("BTCUSDT", 100.0, 0.05, 30, start);
        let notifier = Notifier::new(
            "SPOT SMA Crossover Strategy",
            MarketType::Spot,
            "https://hooks.example.com",
            None,
            "algo-1",
            transport.clone(),
        );
        let manager = SignalManager::new(
            "https://hooks.example.com/events",
            "0",
            "Test",
            "relaybot_test",
            transport,
        );
        TickLoop::new(sma_cross_strategies(), vec![feed], notifier, manager, 360)
    }

    #[tokio::test]
    async fn replay_crosses_produce_signals_after_warm_up() {
        let transport = Arc::new(RecordingTransport::new());
        let mut tick_loop = tick_loop(transport.clone());

        // one full sine period is ~126 bars, enough for both crossings
        tick_loop.run(150).await;
        assert_eq!(tick_loop.ticks_seen(), 150);

        let sent = transport.sent();
        let signals: Vec<_> = sent
            .iter()
            .filter(|(url, _)| url.ends_with("/signal"))
            .collect();
        assert!(!signals.is_empty(), "expected at least one crossover signal");
        for (_, body) in &signals {
            assert!(body.contains("\"symbol\":\"BTCUSDT\""));
        }
    }

    #[tokio::test]
    async fn nothing_leaves_during_warm_up() {
        let transport = Arc::new(RecordingTransport::new());
        let mut tick_loop = tick_loop(transport.clone());

        tick_loop.run(30).await;

        assert!(transport.sent().is_empty());
    }
}
