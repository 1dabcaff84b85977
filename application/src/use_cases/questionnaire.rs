//! Questionnaire stage
//!
//! Pass-through calls to the backend for question generation and request
//! persistence. Gating on their outcome is the stage controller's job.

use crate::ports::backend::{BackendError, BackendGateway};
use forge_domain::{BaseText, ClarifyingQuestions, PromptDetail, QuestionnaireAnswer, RequestId};
use std::sync::Arc;
use tracing::{debug, info};

/// A request the backend has stored
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRequest {
    pub id: RequestId,
    pub record: PromptDetail,
}

/// Use case for generating questions and persisting answers
pub struct QuestionnaireStage<G: BackendGateway + ?Sized> {
    gateway: Arc<G>,
}

impl<G: BackendGateway + ?Sized> QuestionnaireStage<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Generate clarifying questions for the base request
    pub async fn generate(&self, base_text: &BaseText) -> Result<ClarifyingQuestions, BackendError> {
        let questions = self.gateway.generate_questions(base_text).await?;
        info!("Generated {} clarifying questions", questions.len());
        Ok(questions)
    }

    /// Persist the base request with its answers
    pub async fn persist(
        &self,
        base_text: &BaseText,
        answers: &[QuestionnaireAnswer],
    ) -> Result<PersistedRequest, BackendError> {
        debug!("Persisting request with {} answers", answers.len());
        let record = self.gateway.persist_request(base_text, answers).await?;
        let id = RequestId::new(record.id);
        info!("Request persisted with id {}", id);
        Ok(PersistedRequest { id, record })
    }
}
