//! Hub configuration.

use std::time::Duration;

/// Subscription hub configuration.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// How long the subscriber that opens a topic waits for the transport
    /// to confirm the stream. Default: 10s
    pub establish_timeout: Duration,

    /// Prefix for dispatcher thread names.
    pub thread_name_prefix: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            establish_timeout: Duration::from_secs(10),
            thread_name_prefix: "cardstream".to_string(),
        }
    }
}
