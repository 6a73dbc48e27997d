use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{Config, RunMode};
use notifier::{send_test_sequence, HttpTransport, Notifier, SignalManager};
use runner::{SyntheticFeed, TickLoop};
use strategy::{build_strategies, StrategyFileConfig};

/// Replay length in one-minute bars.
const REPLAY_BARS: usize = 720;

const FEED_BASE_PRICE: f64 = 50_000.0;
const FEED_AMPLITUDE: f64 = 0.05;
const FEED_WARMUP_BARS: usize = 30;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(mode = %config.run_mode, market = %config.market_type, "relaybot starting");

    let transport = Arc::new(HttpTransport::new());

    match config.run_mode {
        RunMode::TestSignal => {
            let mut manager = SignalManager::new(
                config.webhook_url.clone(),
                config.project_id.clone(),
                config.algorithm_name.clone(),
                "relaybot_test",
                transport,
            );
            send_test_sequence(&mut manager, "BTCUSD", 95_000.0, 0.1, Utc::now()).await;
        }
        RunMode::Replay => {
            let file_cfg = StrategyFileConfig::load(&config.strategy_config_path);
            let strategies = build_strategies(&file_cfg, config.market_type);

            let algorithm_id = config
                .algorithm_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

            let notifier = Notifier::new(
                config.strategy_name.clone(),
                config.market_type,
                &config.webhook_url,
                config.webhook_token.clone(),
                algorithm_id,
                transport.clone(),
            );
            let manager = SignalManager::new(
                format!("{}/events", config.webhook_url.trim_end_matches('/')),
                config.project_id.clone(),
                config.algorithm_name.clone(),
                "relaybot_live",
                transport,
            );

            let start = Utc::now();
            let mut symbols: Vec<String> =
                strategies.iter().map(|s| s.symbol().to_string()).collect();
            symbols.sort();
            symbols.dedup();
            let feeds = symbols
                .into_iter()
                .map(|symbol| {
                    SyntheticFeed::new(
                        symbol,
                        FEED_BASE_PRICE,
                        FEED_AMPLITUDE,
                        FEED_WARMUP_BARS,
                        start,
                    )
                })
                .collect();

            let mut tick_loop = TickLoop::new(
                strategies,
                feeds,
                notifier,
                manager,
                config.heartbeat_every_ticks,
            );
            tick_loop.run(REPLAY_BARS).await;
        }
    }

    info!("relaybot finished");
}
