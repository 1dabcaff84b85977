//! Recommendation stage
//!
//! Best-effort enrichment: asks the backend which models suit the request.
//! It has no error type; a failed call is logged and yields an empty list.

use crate::ports::backend::BackendGateway;
use forge_domain::{BaseText, ModelName, QuestionnaireAnswer, RequestId};
use std::sync::Arc;
use tracing::{info, warn};

/// Advisory list of suggested models. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recommendation {
    pub models: Vec<ModelName>,
}

impl Recommendation {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn contains(&self, model: &ModelName) -> bool {
        self.models.contains(model)
    }
}

/// Use case for fetching model recommendations
pub struct RecommendationStage<G: BackendGateway + ?Sized> {
    gateway: Arc<G>,
}

impl<G: BackendGateway + ?Sized> RecommendationStage<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn recommend(
        &self,
        request_id: RequestId,
        base_text: &BaseText,
        answers: &[QuestionnaireAnswer],
    ) -> Recommendation {
        match self
            .gateway
            .recommend_models(request_id, base_text, answers)
            .await
        {
            Ok(models) => {
                info!("Backend recommended {} models", models.len());
                Recommendation { models }
            }
            Err(e) => {
                warn!("Failed to fetch model recommendations: {}", e);
                Recommendation::default()
            }
        }
    }
}
