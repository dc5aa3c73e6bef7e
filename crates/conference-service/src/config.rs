use std::env;

use crate::auditor::ReadMode;
use crate::error::ConfigError;

pub const READ_THROUGH_VAR: &str = "CONFERENCE_READ_THROUGH";
pub const AUDITOR_READ_MODE_VAR: &str = "CONFERENCE_AUDITOR_READ_MODE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    read_through: bool,
    auditor_read_mode: ReadMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            read_through: true,
            auditor_read_mode: ReadMode::SeeUncommitted,
        }
    }
}

impl ServiceConfig {
    /// When disabled, repositories read straight from the store. Writes
    /// still invalidate.
    pub fn read_through(mut self, enabled: bool) -> Self {
        self.read_through = enabled;
        self
    }

    pub fn auditor_read_mode(mut self, mode: ReadMode) -> Self {
        self.auditor_read_mode = mode;
        self
    }

    pub fn is_read_through(&self) -> bool {
        self.read_through
    }

    pub fn get_auditor_read_mode(&self) -> ReadMode {
        self.auditor_read_mode
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build from a variable source. Unset variables keep their defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(READ_THROUGH_VAR) {
            config.read_through = parse_bool(&value).ok_or(ConfigError::InvalidValue {
                var: READ_THROUGH_VAR,
                value,
                expected: "true or false",
            })?;
        }
        if let Some(value) = lookup(AUDITOR_READ_MODE_VAR) {
            config.auditor_read_mode = value.parse().map_err(|_| ConfigError::InvalidValue {
                var: AUDITOR_READ_MODE_VAR,
                value,
                expected: "committed or see_uncommitted",
            })?;
        }
        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
