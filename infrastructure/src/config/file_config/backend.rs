//! Backend connection configuration from TOML (`[backend]` section)

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_USERNAME: &str = "testuser";
pub const DEFAULT_PASSWORD: &str = "testpass";

/// Raw backend configuration from TOML
///
/// # Example
///
/// ```toml
/// [backend]
/// base_url = "https://forge.example.com/api"
/// username = "alice"
/// password = "s3cret"
/// timeout_seconds = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Root URL every endpoint path is appended to
    pub base_url: String,
    /// Basic auth user name
    pub username: String,
    /// Basic auth password
    pub password: String,
    /// Per-request timeout; model calls can take minutes
    pub timeout_seconds: u64,
}

impl FileBackendConfig {
    /// True while the development credentials are still in place
    pub fn uses_default_credentials(&self) -> bool {
        self.username == DEFAULT_USERNAME && self.password == DEFAULT_PASSWORD
    }
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            timeout_seconds: 120,
        }
    }
}
