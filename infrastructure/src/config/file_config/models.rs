//! Model catalogue configuration from TOML (`[models]` section)

use forge_domain::{ModelName, RoundStrategy};
use serde::{Deserialize, Serialize};

/// Model catalogue and round scheduling
///
/// # Example
///
/// ```toml
/// [models]
/// available = ["OpenAI GPT-4.1", "Anthropic Claude Sonnet 4"]
/// round_strategy = "concurrent"   # or "sequential" (default)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Models offered for selection, in display order
    pub available: Vec<String>,
    /// How fetches within a round are scheduled
    pub round_strategy: RoundStrategy,
}

impl FileModelsConfig {
    /// Parse the catalogue, skipping blank names.
    ///
    /// Returns the parsed models and the indices of rejected entries.
    pub fn parse_available(&self) -> (Vec<ModelName>, Vec<usize>) {
        let mut models = Vec::new();
        let mut rejected = Vec::new();
        for (index, name) in self.available.iter().enumerate() {
            match ModelName::new(name.as_str()) {
                Ok(model) if !models.contains(&model) => models.push(model),
                Ok(_) => {}
                Err(_) => rejected.push(index),
            }
        }
        (models, rejected)
    }
}

impl Default for FileModelsConfig {
    fn default() -> Self {
        Self {
            available: ModelName::default_catalogue()
                .into_iter()
                .map(|m| m.to_string())
                .collect(),
            round_strategy: RoundStrategy::default(),
        }
    }
}
