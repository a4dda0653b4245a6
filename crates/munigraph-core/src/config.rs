use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config as cfg;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const ENV_PREFIX: &str = "MUNIGRAPH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_port() -> u16 {
        8050
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// SPARQL endpoint access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "SourceConfig::default_endpoint")]
    pub endpoint: String,
    /// Minimum spacing between two requests to the endpoint
    #[serde(default = "SourceConfig::default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
    #[serde(default = "SourceConfig::default_max_retries")]
    pub max_retries: u32,
    /// Retry `n` waits `backoff_factor_ms * 2^(n-1)`
    #[serde(default = "SourceConfig::default_backoff_factor_ms")]
    pub backoff_factor_ms: u64,
    #[serde(default = "SourceConfig::default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
    #[serde(default = "SourceConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SourceConfig {
    fn default_endpoint() -> String {
        "http://classifications.data.admin.ch/query".to_string()
    }

    fn default_min_request_interval_ms() -> u64 {
        1000
    }

    fn default_max_retries() -> u32 {
        3
    }

    fn default_backoff_factor_ms() -> u64 {
        300
    }

    fn default_retry_statuses() -> Vec<u16> {
        vec![500, 502, 504]
    }

    fn default_timeout_secs() -> u64 {
        60
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2_u64.saturating_pow(attempt - 1);
        Duration::from_millis(self.backoff_factor_ms.saturating_mul(factor))
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            min_request_interval_ms: Self::default_min_request_interval_ms(),
            max_retries: Self::default_max_retries(),
            backoff_factor_ms: Self::default_backoff_factor_ms(),
            retry_statuses: Self::default_retry_statuses(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphConfig {
    /// Fixed abolition year for still-active communes. Defaults to the current year.
    #[serde(default)]
    pub active_until: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Log format: "compact" or "pretty"
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    fn default_format() -> String {
        "compact".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host cannot be empty"
        );
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        anyhow::ensure!(
            !self.source.endpoint.trim().is_empty(),
            "source.endpoint cannot be empty"
        );
        anyhow::ensure!(
            self.source.min_request_interval_ms > 0,
            "source.min_request_interval_ms must be > 0"
        );
        anyhow::ensure!(
            matches!(self.logging.format.as_str(), "compact" | "pretty"),
            "logging.format must be \"compact\" or \"pretty\""
        );
        Ok(())
    }
}

/// Resolved configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings: Settings,
    config_dir: PathBuf,
    env: String,
}

impl ConfigManager {
    pub fn load(config_dir: Option<PathBuf>, env_override: Option<String>) -> Result<Self> {
        let env_name = env_override.unwrap_or_else(Self::default_env);
        let config_dir = config_dir.unwrap_or_else(Self::default_config_dir);
        let settings = Self::load_from_sources(&config_dir, &env_name)?;
        settings.validate()?;
        info!("Loaded configuration from {:?} (env: {})", config_dir, env_name);
        Ok(Self {
            settings,
            config_dir,
            env: env_name,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    fn default_env() -> String {
        env::var("MUNIGRAPH_ENV").unwrap_or_else(|_| "development".to_string())
    }

    /// Get the default configuration directory.
    ///
    /// Priority order:
    /// 1. ~/.munigraph/
    /// 2. ./config/
    /// 3. Current directory
    pub fn default_config_dir() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let user_dir = home_dir.join(".munigraph");
            if user_dir.exists() {
                return user_dir;
            }
        }

        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            return project_config;
        }

        cwd
    }

    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Settings> {
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                cfg::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.source.retry_statuses, vec![500, 502, 504]);
        assert_eq!(settings.graph.active_until, None);
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let source = SourceConfig::default();
        assert_eq!(source.backoff(0), Duration::ZERO);
        assert_eq!(source.backoff(1), Duration::from_millis(300));
        assert_eq!(source.backoff(2), Duration::from_millis(600));
        assert_eq!(source.backoff(3), Duration::from_millis(1200));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut settings = Settings::default();
        settings.source.min_request_interval_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut settings = Settings::default();
        settings.logging.format = "json".into();
        assert!(settings.validate().is_err());
    }
}
