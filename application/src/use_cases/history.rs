//! History browser
//!
//! Read-only access to persisted requests and the model outputs stored
//! with them.

use crate::ports::backend::{BackendError, BackendGateway, Page};
use forge_domain::{PromptDetail, PromptSummary, RequestId};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Failed to fetch history. Details: {}", .0.user_message())]
    List(BackendError),

    #[error("Failed to fetch prompt {id}. Details: {}", .source.user_message())]
    Detail { id: RequestId, source: BackendError },
}

/// Use case for browsing past requests
pub struct HistoryBrowser<G: BackendGateway + ?Sized> {
    gateway: Arc<G>,
}

impl<G: BackendGateway + ?Sized> HistoryBrowser<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, page: Page) -> Result<Vec<PromptSummary>, HistoryError> {
        let prompts = self
            .gateway
            .list_history(page)
            .await
            .map_err(HistoryError::List)?;
        info!("Fetched {} history entries", prompts.len());
        Ok(prompts)
    }

    /// Fetch one request with its answers and stored model outputs
    pub async fn detail(&self, id: RequestId) -> Result<PromptDetail, HistoryError> {
        self.gateway
            .get_history_detail(id)
            .await
            .map_err(|source| HistoryError::Detail { id, source })
    }
}
