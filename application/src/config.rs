//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave.

use forge_domain::RoundStrategy;

/// Pipeline behavior configuration.
///
/// Controls how the model-response coordinator schedules a round.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    /// Scheduling of per-model fetches within a round.
    pub round_strategy: RoundStrategy,
}

impl PipelineConfig {
    pub fn with_round_strategy(mut self, strategy: RoundStrategy) -> Self {
        self.round_strategy = strategy;
        self
    }
}
