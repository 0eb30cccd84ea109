//! Store configuration.

use serde::{Deserialize, Serialize};

/// Configuration for an [`EphemeralStore`](crate::EphemeralStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Events buffered per subscriber before new ones are dropped.
    pub subscriber_buffer: usize,
    /// Whether an access directive under the reserved payload key is honoured.
    pub payload_directives: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: 1024,
            payload_directives: true,
        }
    }
}
