use crate::{EventRecord, Result};
use async_trait::async_trait;

/// Supplier of raw change-event rows, ordered by upstream event id.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<EventRecord>>;

    /// Short human-readable name used in logs.
    fn name(&self) -> &str;
}
