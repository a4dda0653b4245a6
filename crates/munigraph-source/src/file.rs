use async_trait::async_trait;
use munigraph_core::{EventRecord, EventSource, MuniGraphError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads records from a JSON array on disk, e.g. a snapshot of a previous fetch.
#[derive(Debug, Clone)]
pub struct FileEventSource {
    path: PathBuf,
}

impl FileEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `records` in the format this source reads back.
    pub async fn write_snapshot(path: impl AsRef<Path>, records: &[EventRecord]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl EventSource for FileEventSource {
    async fn fetch_events(&self) -> Result<Vec<EventRecord>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let records: Vec<EventRecord> = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), records = records.len(), "loaded event snapshot");
        if records.is_empty() {
            return Err(MuniGraphError::EmptySource);
        }
        Ok(records)
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Fixed record set held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSource {
    records: Vec<EventRecord>,
}

impl InMemoryEventSource {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn fetch_events(&self) -> Result<Vec<EventRecord>> {
        if self.records.is_empty() {
            return Err(MuniGraphError::EmptySource);
        }
        Ok(self.records.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
