use chrono::Datelike;

use crate::config::GraphConfig;

/// Values shared by one graph build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    /// Abolition year assigned to intervals that are still active.
    pub active_until: i32,
}

impl BuildContext {
    pub fn new(active_until: i32) -> Self {
        Self { active_until }
    }

    /// Context whose sentinel is the current calendar year.
    pub fn current() -> Self {
        Self::new(chrono::Local::now().year())
    }

    /// Uses the configured override when present, otherwise the current year.
    pub fn from_config(config: &GraphConfig) -> Self {
        match config.active_until {
            Some(year) => Self::new(year),
            None => Self::current(),
        }
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::current()
    }
}
