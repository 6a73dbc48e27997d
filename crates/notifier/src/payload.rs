use serde::Serialize;

use common::{Direction, MarketType, Side};

/// Outbound payloads the dispatcher can stamp a shared-secret token onto.
pub(crate) trait OutboundPayload: Serialize {
    fn set_token(&mut self, token: String);
}

/// Trading-signal payload posted to `<base>/signal`.
///
/// The `qc_id` wire name is what the receiving backend keys runs on; it
/// carries the run identity. Optional fields are omitted when absent.
#[derive(Debug, Clone, Serialize)]
pub struct SignalPayload {
    #[serde(rename = "qc_id")]
    pub run_id: String,
    pub market_type: MarketType,
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub tp: f64,
    pub sl: f64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl OutboundPayload for SignalPayload {
    fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }
}

/// Pre-crossover reminder payload posted to `<base>/reminder`.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderPayload {
    #[serde(rename = "qc_id")]
    pub run_id: String,
    pub market_type: MarketType,
    pub symbol: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl OutboundPayload for ReminderPayload {
    fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }
}

/// Kind of a single-path webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Alert,
    Entry,
    Exit,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Alert => write!(f, "ALERT"),
            EventType::Entry => write!(f, "ENTRY"),
            EventType::Exit => write!(f, "EXIT"),
        }
    }
}

/// Event payload for the single-path webhook variant. The receiver
/// dispatches on the `type` field; `jenis` carries the position direction.
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(rename = "jenis")]
    pub direction: Direction,
    pub symbol: String,
    pub price: f64,
    pub quantity: f64,
    pub target_tp: f64,
    pub target_sl: f64,
    pub message: String,
    pub project_id: String,
    pub algorithm_name: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_optionals_are_omitted_not_null() {
        let payload = SignalPayload {
            run_id: "algo_20260101000000".into(),
            market_type: MarketType::Spot,
            symbol: "BTCUSDT".into(),
            side: Side::Buy,
            price: 100.0,
            tp: 102.5,
            sl: 98.5,
            message: "BUY signal triggered".into(),
            leverage: None,
            margin_usd: None,
            quantity: Some(0.01),
            token: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("leverage"));
        assert!(!json.contains("margin_usd"));
        assert!(!json.contains("token"));
        assert!(!json.contains("null"));
        assert!(json.contains("\"qc_id\":\"algo_20260101000000\""));
        assert!(json.contains("\"market_type\":\"SPOT\""));
        assert!(json.contains("\"side\":\"BUY\""));
        assert!(json.contains("\"quantity\":0.01"));
    }

    #[test]
    fn event_payload_uses_wire_field_names() {
        let payload = EventPayload {
            event_type: EventType::Entry,
            direction: Direction::Long,
            symbol: "BTCUSD".into(),
            price: 95_000.0,
            quantity: 0.1,
            target_tp: 96_900.0,
            target_sl: 93_100.0,
            message: "[BUY] LONG Entry @ $95000.00".into(),
            project_id: "42".into(),
            algorithm_name: "Test".into(),
            source: "relaybot_test".into(),
            realized_pnl: None,
            timestamp: Some("2026-01-01T00:00:00Z".into()),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"type\":\"ENTRY\""));
        assert!(json.contains("\"jenis\":\"LONG\""));
        assert!(json.contains("\"target_tp\":96900.0"));
        assert!(!json.contains("realized_pnl"));
    }
}
