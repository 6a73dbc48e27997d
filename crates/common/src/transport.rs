use async_trait::async_trait;

use crate::Result;

/// Abstraction over the "send this string to this URL" primitive the host
/// runtime provides.
///
/// `HttpTransport` in `crates/notifier` implements this over reqwest.
/// Tests substitute a recording stub.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// POST a JSON body to `url`. Returns `Err` on any transport failure;
    /// the dispatcher decides whether to propagate or swallow it.
    async fn post_json(&self, url: &str, body: String) -> Result<()>;
}
