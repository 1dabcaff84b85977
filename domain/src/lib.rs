//! Domain layer for prompt-forge
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Run
//!
//! One pass of the pipeline for a single base request:
//!
//! 1. **Base request** → clarifying questions
//! 2. **Questionnaire** → answers persisted, request id assigned
//! 3. **Model selection & results** → one fetch per selected model
//!
//! ## Round
//!
//! One model-selection pass. Each model's result is isolated; the
//! optimized prompt shown for the round is taken from the first model in
//! selection order that succeeded with one.

pub mod config;
pub mod core;
pub mod history;
pub mod pipeline;
pub mod questionnaire;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    error::DomainError,
    model::{ModelName, ModelSelection},
    request::{BaseText, Request, RequestId},
    string::preview,
};
pub use history::{ModelOutputRecord, PromptDetail, PromptSummary};
pub use pipeline::{
    ModelResult, ModelResults, PipelineEvent, RoundId, RoundStrategy, RoundSummary, RunState,
    Stage,
};
pub use questionnaire::{ClarifyingQuestions, QuestionnaireAnswer, align_answers};
