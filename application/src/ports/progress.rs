//! Progress notification port
//!
//! Defines the interface for reporting progress while the pipeline runs.

use forge_domain::{ModelName, ModelResult, RoundSummary, Stage};

/// Callback for progress updates during a pipeline run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, progress bars, etc.)
pub trait PipelineProgressNotifier: Send + Sync {
    /// Called when the run moves to a new stage
    fn on_stage_change(&self, _stage: Stage) {}

    /// Called when a model-selection round starts
    fn on_round_start(&self, total_models: usize);

    /// Called when a model's fetch begins
    fn on_model_start(&self, _model: &ModelName) {}

    /// Called when a model's fetch reaches a terminal result
    fn on_model_complete(&self, model: &ModelName, result: &ModelResult);

    /// Called when every model of the round has resolved
    fn on_round_complete(&self, summary: &RoundSummary);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl PipelineProgressNotifier for NoProgress {
    fn on_round_start(&self, _total_models: usize) {}
    fn on_model_complete(&self, _model: &ModelName, _result: &ModelResult) {}
    fn on_round_complete(&self, _summary: &RoundSummary) {}
}
