//! Pipeline stages

use serde::{Deserialize, Serialize};

/// Stage of a pipeline run
///
/// Stages are ordered; a run only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Waiting for the user's base request
    #[default]
    CollectingRequest,
    /// Clarifying questions are shown and answers collected
    Questionnaire,
    /// Request persisted; models can be selected and results shown
    ModelSelectionAndResults,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::CollectingRequest => "collecting_request",
            Stage::Questionnaire => "questionnaire",
            Stage::ModelSelectionAndResults => "model_selection_and_results",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::CollectingRequest => "Base Request",
            Stage::Questionnaire => "Questionnaire",
            Stage::ModelSelectionAndResults => "Model Selection & Results",
        }
    }

    /// 1-based step number shown to the user
    pub fn step(&self) -> u8 {
        match self {
            Stage::CollectingRequest => 1,
            Stage::Questionnaire => 2,
            Stage::ModelSelectionAndResults => 3,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
