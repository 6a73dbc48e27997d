pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use config::{Config, RunMode};
pub use error::{Error, Result};
pub use transport::WebhookTransport;
pub use types::*;
