use serde::{Deserialize, Serialize};
use trove_journal::StorageConfig;

/// Default number of recent transactions searched for a replayed event.
pub const DEFAULT_IDEMPOTENCY_WINDOW: usize = 64;

/// Configuration shared by every transform invocation.
///
/// Deserializes from the same document as [`StorageConfig`], with one
/// optional extra key:
///
/// ```toml
/// idempotency_window = 128
///
/// [repositories]
/// repository = "/var/lib/trove"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintainerConfig {
    #[serde(flatten)]
    pub storage: StorageConfig,
    #[serde(default = "default_window")]
    pub idempotency_window: usize,
}

fn default_window() -> usize {
    DEFAULT_IDEMPOTENCY_WINDOW
}

impl MaintainerConfig {
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            storage,
            idempotency_window: DEFAULT_IDEMPOTENCY_WINDOW,
        }
    }

    pub fn with_idempotency_window(mut self, window: usize) -> Self {
        self.idempotency_window = window;
        self
    }
}
