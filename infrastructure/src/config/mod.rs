//! Configuration file loading for prompt-forge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `FORGE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./forge.toml` or `./.forge.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/prompt-forge/config.toml`
//! 5. Default values
//!
//! CLI flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_BASE_URL, DEFAULT_PASSWORD, DEFAULT_USERNAME,
    FileBackendConfig, FileConfig, FileModelsConfig, FileOutputConfig,
};
pub use loader::ConfigLoader;
