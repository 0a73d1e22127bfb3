use std::time::Duration;

use serde::Deserialize;

/// Options shared by every consumer a manager creates.
///
/// # Fields
/// - `poll_interval_ms`: Delay between the end of one poll cycle and the start of the next.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsumerOptions {
    /// Delay between two polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl ConsumerOptions {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        ConsumerOptions {
            poll_interval_ms: 1000,
        }
    }
}
