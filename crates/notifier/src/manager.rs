use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use common::{Direction, Position, WebhookTransport};

use crate::payload::{EventPayload, EventType};

/// Minimum gap between ALERT events for the same symbol.
const DEFAULT_ALERT_WINDOW_HOURS: i64 = 1;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Single-path webhook dispatcher for position lifecycle events.
///
/// Unlike [`crate::Notifier`], which routes signals and reminders to
/// separate endpoints, this variant posts ALERT, ENTRY and EXIT events to
/// one URL and lets the receiver dispatch on the `type` field. It also
/// tracks the open position per symbol so EXIT can settle realized PnL.
pub struct SignalManager {
    webhook_url: String,
    project_id: String,
    algorithm_name: String,
    source: String,
    alert_window: Duration,
    positions: HashMap<String, Position>,
    last_alert: HashMap<String, DateTime<Utc>>,
    transport: Arc<dyn WebhookTransport>,
}

impl SignalManager {
    pub fn new(
        webhook_url: impl Into<String>,
        project_id: impl Into<String>,
        algorithm_name: impl Into<String>,
        source: impl Into<String>,
        transport: Arc<dyn WebhookTransport>,
    ) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            project_id: project_id.into(),
            algorithm_name: algorithm_name.into(),
            source: source.into(),
            alert_window: Duration::hours(DEFAULT_ALERT_WINDOW_HOURS),
            positions: HashMap::new(),
            last_alert: HashMap::new(),
            transport,
        }
    }

    /// The currently tracked open position for a symbol.
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// True if an ALERT for this symbol fired within the throttle window.
    pub fn recently_alerted(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        self.last_alert
            .get(symbol)
            .is_some_and(|at| now - *at < self.alert_window)
    }

    /// Announce a forming setup before entry confirmation.
    pub async fn send_alert(
        &mut self,
        direction: Direction,
        symbol: &str,
        price: f64,
        take_profit: f64,
        stop_loss: f64,
        reason: &str,
        now: DateTime<Utc>,
    ) {
        self.last_alert.insert(symbol.to_string(), now);
        let payload = EventPayload {
            event_type: EventType::Alert,
            direction,
            symbol: symbol.to_string(),
            price,
            quantity: 0.0,
            target_tp: take_profit,
            target_sl: stop_loss,
            message: reason.to_string(),
            project_id: self.project_id.clone(),
            algorithm_name: self.algorithm_name.clone(),
            source: self.source.clone(),
            realized_pnl: None,
            timestamp: Some(now.format(TIMESTAMP_FORMAT).to_string()),
        };
        self.post(payload).await;
        info!(kind = "TRADE", %symbol, %direction, price, "ALERT sent");
    }

    /// Record an opened position and announce it.
    pub async fn send_entry(
        &mut self,
        direction: Direction,
        symbol: &str,
        price: f64,
        quantity: f64,
        take_profit: f64,
        stop_loss: f64,
        now: DateTime<Utc>,
    ) {
        let side = match direction {
            Direction::Long => "BUY",
            Direction::Short => "SELL",
        };
        let message = format!("[{side}] {direction} Entry @ ${price:.2}");

        self.positions.insert(
            symbol.to_string(),
            Position {
                symbol: symbol.to_string(),
                direction,
                entry_price: price,
                quantity,
                take_profit,
                stop_loss,
                opened_at: now,
            },
        );

        let payload = EventPayload {
            event_type: EventType::Entry,
            direction,
            symbol: symbol.to_string(),
            price,
            quantity,
            target_tp: take_profit,
            target_sl: stop_loss,
            message,
            project_id: self.project_id.clone(),
            algorithm_name: self.algorithm_name.clone(),
            source: self.source.clone(),
            realized_pnl: None,
            timestamp: Some(now.format(TIMESTAMP_FORMAT).to_string()),
        };
        self.post(payload).await;
        info!(kind = "TRADE", %symbol, %direction, price, quantity, "ENTRY sent");
    }

    /// Close the tracked position and announce its realized PnL. A close
    /// with no tracked position is a logic error upstream: warn and skip.
    pub async fn send_exit(&mut self, symbol: &str, price: f64, reason: &str, now: DateTime<Utc>) {
        let Some(position) = self.positions.remove(symbol) else {
            warn!(kind = "ERROR", %symbol, "EXIT requested with no open position");
            return;
        };

        let pnl = position.realized_pnl(price);
        let outcome = if pnl >= 0.0 { "PROFIT" } else { "LOSS" };
        let message = format!("[{outcome}] {reason} | PnL: ${pnl:+.2}");

        let payload = EventPayload {
            event_type: EventType::Exit,
            direction: position.direction,
            symbol: symbol.to_string(),
            price,
            quantity: position.quantity,
            target_tp: 0.0,
            target_sl: 0.0,
            message,
            project_id: self.project_id.clone(),
            algorithm_name: self.algorithm_name.clone(),
            source: self.source.clone(),
            realized_pnl: Some(pnl),
            timestamp: Some(now.format(TIMESTAMP_FORMAT).to_string()),
        };
        self.post(payload).await;
        info!(kind = "TRADE", %symbol, price, pnl, "EXIT sent");
    }

    /// Fire-and-forget delivery; failures end as log lines.
    async fn post(&self, payload: EventPayload) {
        let body = match serde_json::to_string(&payload) {
            Ok(body) => body,
            Err(e) => {
                error!(kind = "ERROR", error = %e, "Event serialization failed");
                return;
            }
        };
        match self.transport.post_json(&self.webhook_url, body).await {
            Ok(()) => debug!(event = %payload.event_type, "Event delivered"),
            Err(e) => {
                error!(kind = "ERROR", event = %payload.event_type, error = %e, "Event delivery failed")
            }
        }
    }
}
