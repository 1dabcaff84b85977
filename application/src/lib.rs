//! Application layer for prompt-forge
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use ports::{
    backend::{BackendError, BackendGateway, GENERIC_ERROR_MESSAGE, ModelReply, Page},
    progress::{NoProgress, PipelineProgressNotifier},
};
pub use use_cases::history::{HistoryBrowser, HistoryError};
pub use use_cases::model_round::{EventSink, ModelResponseCoordinator, RoundOutcome};
pub use use_cases::questionnaire::{PersistedRequest, QuestionnaireStage};
pub use use_cases::recommend::{Recommendation, RecommendationStage};
pub use use_cases::stage_controller::{StageController, StageError};
