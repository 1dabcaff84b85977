//! Output format value object

use serde::{Deserialize, Serialize};

/// How run results are rendered
///
/// This is a domain concept representing how the output should be formatted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Formatted console output (default)
    #[default]
    Full,
    /// JSON output of the final run state
    Json,
}
