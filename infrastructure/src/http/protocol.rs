//! JSON wire types for the prompt backend.
//!
//! Request bodies borrow from the caller; responses are owned. Domain
//! types that already match the wire shape (`PromptDetail`,
//! `PromptSummary`, `QuestionnaireAnswer`) are used directly.

use forge_domain::QuestionnaireAnswer;
use serde::{Deserialize, Serialize};

/// `POST /generate_questionnaire`
#[derive(Debug, Serialize)]
pub struct GenerateQuestionnaireRequest<'a> {
    pub base_prompt: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionnaireResponse {
    #[serde(default)]
    pub questions: Vec<String>,
}

/// `POST /submit_questionnaire`
#[derive(Debug, Serialize)]
pub struct SubmitQuestionnaireRequest<'a> {
    pub base_prompt: &'a str,
    pub responses: &'a [QuestionnaireAnswer],
}

/// `POST /recommend_models`
#[derive(Debug, Serialize)]
pub struct RecommendModelsRequest<'a> {
    pub prompt_id: i64,
    pub base_prompt: &'a str,
    pub questionnaire_responses: &'a [QuestionnaireAnswer],
}

#[derive(Debug, Deserialize)]
pub struct RecommendModelsResponse {
    #[serde(default)]
    pub models: Vec<String>,
}

/// `POST /get_model_response`
#[derive(Debug, Serialize)]
pub struct ModelResponseRequest<'a> {
    pub prompt_id: i64,
    pub model_name: &'a str,
}

/// Error body returned with non-success statuses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Render `detail` for display: strings verbatim, anything else as
    /// compact JSON.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
