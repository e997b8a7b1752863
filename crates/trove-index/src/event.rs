use serde::{Deserialize, Serialize};
use trove_types::Dataset;

/// A change to one resource, as delivered by the stream runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Identifier of the changed resource; the runtime's partition key.
    pub key: String,
    pub dataset: Dataset,
    /// Stable identity of this delivery (for example topic, partition and
    /// offset). Redeliveries of the same event carry the same value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_key: Option<String>,
}

impl ChangeEvent {
    pub fn new(key: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            key: key.into(),
            dataset,
            delivery_key: None,
        }
    }

    pub fn with_delivery_key(mut self, delivery_key: impl Into<String>) -> Self {
        self.delivery_key = Some(delivery_key.into());
        self
    }
}
