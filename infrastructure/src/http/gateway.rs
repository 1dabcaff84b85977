//! HTTP backend gateway implementation

use super::protocol::{
    ErrorBody, GenerateQuestionnaireRequest, GenerateQuestionnaireResponse,
    ModelResponseRequest, RecommendModelsRequest, RecommendModelsResponse,
    SubmitQuestionnaireRequest,
};
use crate::config::FileBackendConfig;
use async_trait::async_trait;
use forge_application::ports::backend::{BackendError, BackendGateway, ModelReply, Page};
use forge_domain::{
    BaseText, ClarifyingQuestions, ModelName, PromptDetail, PromptSummary, QuestionnaireAnswer,
    RequestId,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend gateway speaking JSON over HTTP with Basic authentication
pub struct HttpBackendGateway {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpBackendGateway {
    /// Build a gateway from the `[backend]` configuration
    pub fn new(config: &FileBackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        if config.uses_default_credentials() {
            warn!("Using default backend credentials; set [backend] username/password");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send an authenticated request and decode the JSON reply
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<T, BackendError> {
        debug!("Calling backend {}", endpoint);
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail_text());
            debug!("Backend {} failed with {}: {:?}", endpoint, status, detail);
            return Err(BackendError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let decoded = response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("{}: {}", endpoint, e)))?;
        debug!("Backend {} succeeded", endpoint);
        Ok(decoded)
    }
}

fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Connection(e.to_string())
    }
}

#[async_trait]
impl BackendGateway for HttpBackendGateway {
    async fn generate_questions(
        &self,
        base_text: &BaseText,
    ) -> Result<ClarifyingQuestions, BackendError> {
        let request = self
            .client
            .post(self.url("/generate_questionnaire"))
            .json(&GenerateQuestionnaireRequest {
                base_prompt: base_text.content(),
            });
        let response: GenerateQuestionnaireResponse =
            self.send(request, "generate_questionnaire").await?;
        Ok(ClarifyingQuestions::new(response.questions))
    }

    async fn persist_request(
        &self,
        base_text: &BaseText,
        answers: &[QuestionnaireAnswer],
    ) -> Result<PromptDetail, BackendError> {
        let request = self
            .client
            .post(self.url("/submit_questionnaire"))
            .json(&SubmitQuestionnaireRequest {
                base_prompt: base_text.content(),
                responses: answers,
            });
        self.send(request, "submit_questionnaire").await
    }

    async fn recommend_models(
        &self,
        request_id: RequestId,
        base_text: &BaseText,
        answers: &[QuestionnaireAnswer],
    ) -> Result<Vec<ModelName>, BackendError> {
        let request = self
            .client
            .post(self.url("/recommend_models"))
            .json(&RecommendModelsRequest {
                prompt_id: request_id.value(),
                base_prompt: base_text.content(),
                questionnaire_responses: answers,
            });
        let response: RecommendModelsResponse = self.send(request, "recommend_models").await?;

        // Blank names carry no information; drop them rather than fail.
        Ok(response
            .models
            .into_iter()
            .filter_map(|name| ModelName::new(name).ok())
            .collect())
    }

    async fn get_model_response(
        &self,
        request_id: RequestId,
        model: &ModelName,
    ) -> Result<ModelReply, BackendError> {
        let request = self
            .client
            .post(self.url("/get_model_response"))
            .json(&ModelResponseRequest {
                prompt_id: request_id.value(),
                model_name: model.as_str(),
            });
        self.send(request, "get_model_response").await
    }

    async fn list_history(&self, page: Page) -> Result<Vec<PromptSummary>, BackendError> {
        let request = self
            .client
            .get(self.url("/history/prompts"))
            .query(&[("skip", page.skip), ("limit", page.limit)]);
        self.send(request, "history/prompts").await
    }

    async fn get_history_detail(&self, id: RequestId) -> Result<PromptDetail, BackendError> {
        let request = self
            .client
            .get(self.url(&format!("/history/prompt/{}", id)));
        self.send(request, "history/prompt").await
    }
}
