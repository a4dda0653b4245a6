pub mod config;
pub mod context;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{ConfigManager, GraphConfig, LoggingConfig, ServerConfig, Settings, SourceConfig};
pub use context::*;
pub use error::*;
pub use traits::*;
pub use types::*;
