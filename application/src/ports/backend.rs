//! Backend gateway port
//!
//! Defines the interface for talking to the prompt backend: question
//! generation, persistence, recommendations, per-model responses and
//! history.

use async_trait::async_trait;
use forge_domain::{
    BaseText, ClarifyingQuestions, ModelName, PromptDetail, PromptSummary, QuestionnaireAnswer,
    RequestId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when a failure carries no backend detail
pub const GENERIC_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Errors that can occur during backend calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered with a non-success status
    #[error("Backend returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        BackendError::Api {
            status,
            detail: Some(detail.into()),
        }
    }

    /// The backend's `detail` field, if the error carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Api {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }

    /// Message to show the user: the backend detail verbatim, else a
    /// generic fallback.
    pub fn user_message(&self) -> &str {
        self.detail().unwrap_or(GENERIC_ERROR_MESSAGE)
    }
}

/// One model's response for a persisted request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReply {
    pub output: String,
    #[serde(default)]
    pub optimized_prompt_used: Option<String>,
}

impl ModelReply {
    pub fn new(output: impl Into<String>, optimized_prompt_used: Option<String>) -> Self {
        Self {
            output: output.into(),
            optimized_prompt_used,
        }
    }
}

/// Paging for history listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

/// Gateway to the prompt backend
///
/// This port defines how the application layer reaches the backend.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Generate clarifying questions for a base request
    async fn generate_questions(
        &self,
        base_text: &BaseText,
    ) -> Result<ClarifyingQuestions, BackendError>;

    /// Persist the base request with its answers; the backend assigns the id
    async fn persist_request(
        &self,
        base_text: &BaseText,
        answers: &[QuestionnaireAnswer],
    ) -> Result<PromptDetail, BackendError>;

    /// Ask for advisory model suggestions
    async fn recommend_models(
        &self,
        request_id: RequestId,
        base_text: &BaseText,
        answers: &[QuestionnaireAnswer],
    ) -> Result<Vec<ModelName>, BackendError>;

    /// Fetch one model's response for a persisted request
    async fn get_model_response(
        &self,
        request_id: RequestId,
        model: &ModelName,
    ) -> Result<ModelReply, BackendError>;

    /// List persisted requests
    async fn list_history(&self, page: Page) -> Result<Vec<PromptSummary>, BackendError>;

    /// Fetch one persisted request with answers and model outputs
    async fn get_history_detail(&self, id: RequestId) -> Result<PromptDetail, BackendError>;
}
