use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use common::{MarketType, SignalRequest, WebhookTransport};

use crate::payload::{OutboundPayload, ReminderPayload, SignalPayload};

/// Sentinel run id used when generation fails.
const UNKNOWN_RUN_ID: &str = "unknown";

/// Convert a display name to a URL-friendly slug: lowercase, runs of
/// non-alphanumeric characters collapsed to single hyphens, trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Relays signal and reminder notifications to the webhook backend.
///
/// The dispatcher starts dormant: every send is written to the log and not
/// transmitted, so a warm-up or backtest run never floods the endpoint.
/// `enable` switches it to active for the rest of the run; there is no way
/// back. Delivery is fire-and-forget: transport failures are logged and
/// dropped, never raised to the caller, never retried.
pub struct Notifier {
    display_name: String,
    slug: String,
    market_type: MarketType,
    base_url: String,
    token: Option<String>,
    algorithm_id: String,
    run_id: Option<String>,
    enabled: bool,
    transport: Arc<dyn WebhookTransport>,
}

impl Notifier {
    pub fn new(
        display_name: impl Into<String>,
        market_type: MarketType,
        base_url: &str,
        token: Option<String>,
        algorithm_id: impl Into<String>,
        transport: Arc<dyn WebhookTransport>,
    ) -> Self {
        let display_name = display_name.into();
        let slug = slugify(&display_name);
        info!(strategy = %slug, market = %market_type, "Notifier initialized");
        Self {
            display_name,
            slug,
            market_type,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            algorithm_id: algorithm_id.into(),
            run_id: None,
            enabled: false,
            transport,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The cached run identity, if already generated.
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    /// Switch from dormant to active. Establishes the run identity if it
    /// does not exist yet.
    pub fn enable(&mut self, now: DateTime<Utc>) {
        if self.run_id.is_none() {
            self.generate_run_id(now);
        }
        self.enabled = true;
        info!(kind = "INFO", strategy = %self.slug, "Webhook notifications enabled");
    }

    /// Post a trading signal to `<base>/signal`. Dormant: log-only no-op.
    pub async fn send_signal(&mut self, req: &SignalRequest, now: DateTime<Utc>) {
        if !self.enabled {
            info!(
                kind = "TRADE",
                symbol = %req.symbol,
                side = %req.side,
                price = req.price,
                "[OFFLINE] Signal prepared"
            );
            return;
        }

        let run_id = self.ensure_run_id(now);
        let message = req.message.clone().unwrap_or_else(|| {
            format!("{} signal triggered - {}", req.side, self.display_name)
        });

        let payload = SignalPayload {
            run_id,
            market_type: self.market_type,
            symbol: req.symbol.clone(),
            side: req.side,
            price: req.price,
            tp: req.take_profit,
            sl: req.stop_loss,
            message,
            leverage: req.options.leverage.map(i64::from),
            margin_usd: req.options.margin_usd,
            quantity: req.options.quantity,
            token: None,
        };
        self.post("signal", payload).await;

        info!(
            kind = "TRADE",
            symbol = %req.symbol,
            side = %req.side,
            price = req.price,
            tp = req.take_profit,
            sl = req.stop_loss,
            "Signal sent"
        );
    }

    /// Post a pre-crossover reminder to `<base>/reminder`. Dormant:
    /// log-only no-op.
    pub async fn send_reminder(&mut self, symbol: &str, message: &str, now: DateTime<Utc>) {
        if !self.enabled {
            info!(
                kind = "REMINDER",
                symbol = %symbol,
                message = %message,
                "[OFFLINE] Reminder prepared"
            );
            return;
        }

        let run_id = self.ensure_run_id(now);
        let payload = ReminderPayload {
            run_id,
            market_type: self.market_type,
            symbol: symbol.to_string(),
            message: message.to_string(),
            token: None,
        };
        self.post("reminder", payload).await;

        info!(kind = "REMINDER", symbol = %symbol, message = %message, "Reminder sent");
    }

    /// Liveness line for the host's periodic schedule. Log-only; nothing
    /// goes over the wire.
    pub fn heartbeat(&self, message: &str) {
        info!(kind = "INFO", strategy = %self.slug, "{message}");
    }

    fn ensure_run_id(&mut self, now: DateTime<Utc>) -> String {
        if self.run_id.is_none() {
            self.generate_run_id(now);
        }
        self.run_id.clone().unwrap_or_else(|| UNKNOWN_RUN_ID.to_string())
    }

    fn generate_run_id(&mut self, now: DateTime<Utc>) {
        let id = self.algorithm_id.trim();
        let run_id = if id.is_empty() {
            error!(kind = "ERROR", "Run id generation failed: algorithm id is empty");
            UNKNOWN_RUN_ID.to_string()
        } else {
            format!("{id}_{}", now.format("%Y%m%d%H%M%S"))
        };
        info!(kind = "INFO", run_id = %run_id, "Run id generated");
        self.run_id = Some(run_id);
    }

    /// Stamp the token if configured, serialize and fire. All failures end
    /// here as log lines.
    async fn post<P: OutboundPayload>(&self, endpoint: &str, mut payload: P) {
        if let Some(token) = &self.token {
            payload.set_token(token.clone());
        }
        let body = match serde_json::to_string(&payload) {
            Ok(body) => body,
            Err(e) => {
                error!(kind = "ERROR", endpoint, error = %e, "Payload serialization failed");
                return;
            }
        };

        let url = format!("{}/{}", self.base_url, endpoint);
        match self.transport.post_json(&url, body).await {
            Ok(()) => debug!(endpoint, "Webhook delivered"),
            Err(e) => error!(kind = "ERROR", endpoint, error = %e, "Webhook delivery failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingTransport;
    use common::{Side, SignalOptions};

    fn request(symbol: &str) -> SignalRequest {
        SignalRequest {
            symbol: symbol.to_string(),
            side: Side::Buy,
            price: 100.0,
            take_profit: 105.0,
            stop_loss: 98.0,
            options: SignalOptions::default(),
            message: None,
        }
    }

    fn notifier(token: Option<String>, transport: Arc<RecordingTransport>) -> Notifier {
        Notifier::new(
            "FUTURES SMA Crossover Strategy",
            MarketType::Futures,
            "https://hooks.example.com/api/webhook/",
            token,
            "algo-1",
            transport,
        )
    }

    #[test]
    fn slug_derivation() {
        assert_eq!(
            slugify("FUTURES SMA Crossover Strategy"),
            "futures-sma-crossover-strategy"
        );
        assert_eq!(slugify("  My -- Strategy!! "), "my-strategy");
        assert_eq!(slugify("123 ABC"), "123-abc");
    }

    #[tokio::test]
    async fn dormant_send_produces_no_request() {
        let transport = Arc::new(RecordingTransport::new());
        let mut notifier = notifier(None, transport.clone());

        notifier.send_signal(&request("BTCUSDT"), Utc::now()).await;
        notifier.send_reminder("BTCUSDT", "heads up", Utc::now()).await;

        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn active_signal_posts_to_signal_endpoint_with_token() {
        let transport = Arc::new(RecordingTransport::new());
        let mut notifier = notifier(Some("abc".into()), transport.clone());
        notifier.enable(Utc::now());

        notifier.send_signal(&request("BTCUSDT"), Utc::now()).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        let (url, body) = &sent[0];
        assert_eq!(url, "https://hooks.example.com/api/webhook/signal");
        assert!(body.contains("\"token\":\"abc\""));
        assert!(body.contains("\"market_type\":\"FUTURES\""));
    }

    #[tokio::test]
    async fn default_message_names_side_and_strategy() {
        let transport = Arc::new(RecordingTransport::new());
        let mut notifier = notifier(None, transport.clone());
        notifier.enable(Utc::now());

        notifier.send_signal(&request("BTCUSDT"), Utc::now()).await;

        let (_, body) = &transport.sent()[0];
        assert!(body.contains("BUY signal triggered - FUTURES SMA Crossover Strategy"));
    }

    #[tokio::test]
    async fn reminder_payload_is_light() {
        let transport = Arc::new(RecordingTransport::new());
        let mut notifier = notifier(None, transport.clone());
        notifier.enable(Utc::now());

        notifier.send_reminder("BTCUSDT", "almost crossing", Utc::now()).await;

        let (url, body) = &transport.sent()[0];
        assert_eq!(url, "https://hooks.example.com/api/webhook/reminder");
        assert!(body.contains("\"symbol\":\"BTCUSDT\""));
        assert!(body.contains("\"message\":\"almost crossing\""));
        assert!(!body.contains("\"price\""));
        assert!(!body.contains("\"side\""));
    }

    #[tokio::test]
    async fn run_id_is_cached_for_the_whole_run() {
        let transport = Arc::new(RecordingTransport::new());
        let mut notifier = notifier(None, transport.clone());

        let t0 = "2026-01-02T03:04:05Z".parse::<DateTime<Utc>>().unwrap();
        notifier.enable(t0);
        assert_eq!(notifier.run_id(), Some("algo-1_20260102030405"));

        // a later send must not regenerate the id
        let t1 = "2026-05-06T07:08:09Z".parse::<DateTime<Utc>>().unwrap();
        notifier.send_signal(&request("BTCUSDT"), t1).await;
        let (_, body) = &transport.sent()[0];
        assert!(body.contains("algo-1_20260102030405"));
    }

    #[tokio::test]
    async fn blank_algorithm_id_falls_back_to_unknown() {
        let transport = Arc::new(RecordingTransport::new());
        let mut notifier = Notifier::new(
            "Test",
            MarketType::Spot,
            "https://hooks.example.com",
            None,
            "  ",
            transport.clone(),
        );
        notifier.enable(Utc::now());
        assert_eq!(notifier.run_id(), Some("unknown"));
    }

    #[tokio::test]
    async fn transport_failure_is_swallowed() {
        let transport = Arc::new(RecordingTransport::failing());
        let mut notifier = notifier(None, transport.clone());
        notifier.enable(Utc::now());

        // must not panic or surface the error
        notifier.send_signal(&request("BTCUSDT"), Utc::now()).await;
        assert_eq!(transport.sent().len(), 1);
    }
}
