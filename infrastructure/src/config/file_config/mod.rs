//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backend;
mod models;
mod output;

pub use backend::{DEFAULT_BASE_URL, DEFAULT_PASSWORD, DEFAULT_USERNAME, FileBackendConfig};
pub use models::FileModelsConfig;
pub use output::FileOutputConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that make a configuration unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("backend.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("backend.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("models.available[{0}]: model name cannot be empty")]
    EmptyModelName(usize),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection settings
    pub backend: FileBackendConfig,
    /// Model catalogue and round scheduling
    pub models: FileModelsConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration, returning every problem found
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.backend.timeout_seconds == 0 {
            errors.push(ConfigValidationError::InvalidTimeout);
        }
        if self.backend.base_url.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyBaseUrl);
        }
        let (_, rejected) = self.models.parse_available();
        errors.extend(
            rejected
                .into_iter()
                .map(ConfigValidationError::EmptyModelName),
        );

        errors
    }
}
