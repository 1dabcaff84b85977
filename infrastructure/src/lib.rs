//! Infrastructure layer for prompt-forge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod http;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBackendConfig, FileConfig, FileModelsConfig,
    FileOutputConfig,
};
pub use http::gateway::HttpBackendGateway;
