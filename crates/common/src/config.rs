use crate::MarketType;

/// All runtime configuration loaded from environment variables at startup.
/// Missing or invalid required variables cause an immediate panic with a
/// clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Webhook endpoint
    pub webhook_url: String,
    pub webhook_token: Option<String>,

    // Strategy identity
    pub market_type: MarketType,
    pub strategy_name: String,
    /// Host-assigned run identifier. Generated by the binary when unset.
    pub algorithm_id: Option<String>,

    // Event-stream identity (single-path webhook variant)
    pub project_id: String,
    pub algorithm_name: String,

    // Execution
    pub run_mode: RunMode,
    pub strategy_config_path: String,
    /// Heartbeat log cadence, in ticks. 360 one-minute bars = every 6 hours.
    pub heartbeat_every_ticks: u64,
}

/// What the binary does after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Drive the strategies from the synthetic replay feed.
    Replay,
    /// Fire a one-shot ALERT/ENTRY/EXIT sequence at the webhook and exit.
    TestSignal,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Replay => write!(f, "replay"),
            RunMode::TestSignal => write!(f, "test-signal"),
        }
    }
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let market_type: MarketType = required_env("MARKET_TYPE")
            .parse()
            .unwrap_or_else(|e| panic!("ERROR: {e}"));

        let run_mode = match optional_env("RUN_MODE").as_deref() {
            None | Some("replay") => RunMode::Replay,
            Some("test-signal") => RunMode::TestSignal,
            Some(other) => panic!(
                "ERROR: RUN_MODE must be 'replay' or 'test-signal', got: '{other}'"
            ),
        };

        Config {
            webhook_url: required_env("WEBHOOK_URL"),
            webhook_token: optional_env("WEBHOOK_TOKEN"),
            market_type,
            strategy_name: optional_env("STRATEGY_NAME")
                .unwrap_or_else(|| "SMA Crossover Strategy".to_string()),
            algorithm_id: optional_env("ALGORITHM_ID"),
            project_id: optional_env("PROJECT_ID").unwrap_or_else(|| "0".to_string()),
            algorithm_name: optional_env("ALGORITHM_NAME")
                .unwrap_or_else(|| "RelayBot Algorithm".to_string()),
            run_mode,
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategies.toml".to_string()),
            heartbeat_every_ticks: optional_env("HEARTBEAT_EVERY_TICKS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(360),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
