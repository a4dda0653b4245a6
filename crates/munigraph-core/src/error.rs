use thiserror::Error;

#[derive(Error, Debug)]
pub enum MuniGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown event kind for labels ({abolition:?}, {admission:?})")]
    UnknownEventKind { abolition: String, admission: String },

    #[error("Malformed interval for {name}: admission {admission} is after abolition {abolition}")]
    MalformedInterval {
        name: String,
        admission: i32,
        abolition: i32,
    },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Conflicting attributes for node: {0}")]
    ConflictingNode(String),

    #[error("Event source returned no rows")]
    EmptySource,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("External service error: {0}")]
    External(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MuniGraphError {
    /// True for failures that originate in the event source rather than in the data.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            MuniGraphError::EmptySource
                | MuniGraphError::Network(_)
                | MuniGraphError::Timeout(_)
                | MuniGraphError::External(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MuniGraphError>;
