//! Per-model result lifecycle and the ordered result mapping of a round.

use crate::core::model::{ModelName, ModelSelection};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Lifecycle of one model's fetch within a round
///
/// `Pending -> Loading -> Success | Error`. Terminal states are never left
/// within the same round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ModelResult {
    Pending,
    Loading,
    Success {
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        optimized_prompt_used: Option<String>,
    },
    Error {
        message: String,
    },
}

impl ModelResult {
    pub fn success(output: impl Into<String>, optimized_prompt_used: Option<String>) -> Self {
        ModelResult::Success {
            output: output.into(),
            optimized_prompt_used,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ModelResult::Error {
            message: message.into(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ModelResult::Pending => "pending",
            ModelResult::Loading => "loading",
            ModelResult::Success { .. } => "success",
            ModelResult::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ModelResult::Success { .. } | ModelResult::Error { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ModelResult::Success { .. })
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            ModelResult::Success { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ModelResult::Error { message } => Some(message),
            _ => None,
        }
    }

    /// The optimized prompt this result reports, if present and non-empty
    pub fn optimized_prompt(&self) -> Option<&str> {
        match self {
            ModelResult::Success {
                optimized_prompt_used: Some(prompt),
                ..
            } if !prompt.is_empty() => Some(prompt),
            _ => None,
        }
    }
}

/// Ordered mapping model name -> result, in selection order
///
/// The key set is fixed when the mapping is created; updates to unknown
/// models are refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResults {
    entries: Vec<(ModelName, ModelResult)>,
}

impl ModelResults {
    /// Every selected model starts in `Pending`.
    pub fn pending_for(selection: &ModelSelection) -> Self {
        Self {
            entries: selection
                .iter()
                .map(|m| (m.clone(), ModelResult::Pending))
                .collect(),
        }
    }

    pub fn get(&self, model: &ModelName) -> Option<&ModelResult> {
        self.entries
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, result)| result)
    }

    /// Replace a model's result. Returns false when the model is not part
    /// of this mapping or is already terminal.
    pub fn update(&mut self, model: &ModelName, result: ModelResult) -> bool {
        match self.entries.iter_mut().find(|(name, _)| name == model) {
            Some((_, current)) if !current.is_terminal() => {
                *current = result;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModelName, &ModelResult)> {
        self.entries.iter().map(|(name, result)| (name, result))
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelName> {
        self.entries.iter().map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once every model has reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, r)| r.is_terminal())
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, r)| matches!(r, ModelResult::Error { .. }))
            .count()
    }

    /// The optimized prompt to display, if it can be decided yet.
    ///
    /// Walks results in selection order: terminal results without a prompt
    /// are skipped, the first success with a non-empty prompt wins, and an
    /// unresolved model stops the walk. Arrival order never matters.
    pub fn decided_optimized_prompt(&self) -> Option<&str> {
        for (_, result) in &self.entries {
            if !result.is_terminal() {
                return None;
            }
            if let Some(prompt) = result.optimized_prompt() {
                return Some(prompt);
            }
        }
        None
    }
}

impl Serialize for ModelResults {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name.as_str(), result)?;
        }
        map.end()
    }
}
