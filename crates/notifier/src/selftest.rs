use chrono::{DateTime, Utc};
use tracing::info;

use common::Direction;

use crate::manager::SignalManager;

/// Walk one synthetic LONG position through its whole lifecycle so the
/// receiving backend can be verified end to end: ALERT, then ENTRY slightly
/// above the alert price, then a take-profit EXIT just under target.
pub async fn send_test_sequence(
    manager: &mut SignalManager,
    symbol: &str,
    price: f64,
    quantity: f64,
    now: DateTime<Utc>,
) {
    let take_profit = price * 1.02;
    let stop_loss = price * 0.98;

    info!(kind = "INFO", %symbol, price, "Sending webhook test sequence");

    manager
        .send_alert(
            Direction::Long,
            symbol,
            price,
            take_profit,
            stop_loss,
            "RSI oversold + EMA crossover forming. Preparing LONG...",
            now,
        )
        .await;

    let entry_price = price * 1.001;
    manager
        .send_entry(
            Direction::Long,
            symbol,
            entry_price,
            quantity,
            take_profit,
            stop_loss,
            now,
        )
        .await;

    let exit_price = take_profit * 0.99;
    manager
        .send_exit(symbol, exit_price, "Take Profit Hit!", now)
        .await;

    info!(kind = "INFO", %symbol, "Webhook test sequence complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingTransport;
    use std::sync::Arc;

    #[tokio::test]
    async fn sequence_posts_alert_entry_exit_in_order() {
        let transport = Arc::new(RecordingTransport::new());
        let mut mgr = SignalManager::new(
            "https://hooks.example.com/events",
            "0",
            "Test",
            "relaybot_test",
            transport.clone(),
        );

        send_test_sequence(&mut mgr, "BTCUSD", 95_000.0, 0.1, Utc::now()).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].1.contains("\"type\":\"ALERT\""));
        assert!(sent[1].1.contains("\"type\":\"ENTRY\""));
        assert!(sent[2].1.contains("\"type\":\"EXIT\""));
        // exit lands below take profit but above entry: a profit
        assert!(sent[2].1.contains("[PROFIT]"));
        // position fully settled
        assert!(mgr.position("BTCUSD").is_none());
    }
}
