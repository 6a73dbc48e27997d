use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level strategy config file (TOML).
///
/// Example `config/strategies.toml`:
/// ```toml
/// [[strategy]]
/// type = "sma-cross"
/// name = "FUTURES SMA Crossover Strategy"
/// symbol = "BTCUSDT"
///
/// [strategy.params]
/// fast = 10
/// slow = 30
/// tp_pct = 0.05
/// sl_pct = 0.02
/// leverage = 10
/// margin_usd = 100.0
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Strategy type identifier: "sma-cross" or "rsi-revert".
    #[serde(rename = "type")]
    pub strategy_type: String,
    /// Human-readable name shown in logs and notification messages.
    pub name: String,
    /// Symbol to watch, e.g. "BTCUSDT".
    pub symbol: String,
    /// Strategy-specific parameters.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

impl StrategyFileConfig {
    /// Load from a TOML file. Exits process on error.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
            panic!("Failed to read strategy config at '{path}': {e}")
        });
        toml::from_str(&content).unwrap_or_else(|e| {
            panic!("Failed to parse strategy config at '{path}': {e}")
        })
    }
}
