//! Round configuration and outcome value objects

use super::model_result::ModelResults;
use super::run_state::RoundId;
use serde::{Deserialize, Serialize};

/// How the fetches of one round are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStrategy {
    /// One model at a time, in selection order
    #[default]
    Sequential,
    /// All fetches at once; the displayed prompt still follows selection order
    Concurrent,
}

impl RoundStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            RoundStrategy::Sequential => "sequential",
            RoundStrategy::Concurrent => "concurrent",
        }
    }
}

impl std::fmt::Display for RoundStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a completed round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round: RoundId,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_prompt: Option<String>,
}

impl RoundSummary {
    pub fn from_results(round: RoundId, results: &ModelResults, optimized_prompt: Option<&str>) -> Self {
        Self {
            round,
            total: results.len(),
            succeeded: results.succeeded(),
            failed: results.failed(),
            optimized_prompt: optimized_prompt.map(str::to_string),
        }
    }

    /// True when no model produced an output
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }
}
