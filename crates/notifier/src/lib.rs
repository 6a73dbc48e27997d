pub mod dispatcher;
pub mod http;
pub mod manager;
pub mod payload;
pub mod selftest;

pub use dispatcher::{slugify, Notifier};
pub use http::HttpTransport;
pub use manager::SignalManager;
pub use selftest::send_test_sequence;

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use common::{Result, WebhookTransport};

    /// Transport stub that records every outbound request.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub requests: Arc<Mutex<Vec<(String, String)>>>,
        pub fail: bool,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<(String, String)> {
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
            if self.fail {
                return Err(common::Error::Transport("connection refused".into()));
            }
            Ok(())
        }
    }
}
