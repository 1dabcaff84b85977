//! Model response coordinator
//!
//! Runs one model-selection round: one fetch per selected model, each with
//! its own isolated lifecycle, and decides which optimized prompt is shown.
//!
//! The displayed prompt always comes from the first model in *selection*
//! order that succeeded with a non-empty prompt. Sequential rounds get this
//! for free; concurrent rounds only settle it once every earlier model has
//! resolved (see [`ModelResults::decided_optimized_prompt`]).

use crate::ports::backend::{BackendGateway, GENERIC_ERROR_MESSAGE};
use crate::ports::progress::PipelineProgressNotifier;
use forge_domain::{
    ModelName, ModelResult, ModelResults, ModelSelection, PipelineEvent, RequestId, RoundId,
    RoundStrategy,
};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Receives every state change of a round, in order
pub type EventSink<'a> = &'a (dyn Fn(PipelineEvent) + Send + Sync);

/// Final results of a round as seen by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub results: ModelResults,
    pub optimized_prompt: Option<String>,
}

impl RoundOutcome {
    fn start(selection: &ModelSelection) -> Self {
        Self {
            results: ModelResults::pending_for(selection),
            optimized_prompt: None,
        }
    }

    fn loading(&mut self, model: &ModelName) {
        self.results.update(model, ModelResult::Loading);
    }

    fn resolve(&mut self, model: &ModelName, result: ModelResult) {
        self.results.update(model, result);
        if self.optimized_prompt.is_none() {
            self.optimized_prompt = self.results.decided_optimized_prompt().map(str::to_string);
        }
    }
}

/// Use case for fetching one response per selected model
pub struct ModelResponseCoordinator<G: BackendGateway + ?Sized + 'static> {
    gateway: Arc<G>,
    strategy: RoundStrategy,
}

impl<G: BackendGateway + ?Sized + 'static> ModelResponseCoordinator<G> {
    pub fn new(gateway: Arc<G>, strategy: RoundStrategy) -> Self {
        Self { gateway, strategy }
    }

    pub fn strategy(&self) -> RoundStrategy {
        self.strategy
    }

    /// Execute one round.
    ///
    /// `events` must already have seen `RoundStarted` for `round`; every
    /// later transition of the round is sent through it.
    pub async fn run_round(
        &self,
        round: RoundId,
        request_id: RequestId,
        selection: &ModelSelection,
        events: EventSink<'_>,
        progress: &dyn PipelineProgressNotifier,
    ) -> RoundOutcome {
        info!(
            "Round {} started with {} models ({})",
            round,
            selection.len(),
            self.strategy
        );
        progress.on_round_start(selection.len());

        let outcome = match self.strategy {
            RoundStrategy::Sequential => {
                self.run_sequential(round, request_id, selection, events, progress)
                    .await
            }
            RoundStrategy::Concurrent => {
                self.run_concurrent(round, request_id, selection, events, progress)
                    .await
            }
        };

        info!(
            "Round {} finished: {}/{} models succeeded",
            round,
            outcome.results.succeeded(),
            outcome.results.len()
        );
        outcome
    }

    /// One model at a time; fetch k+1 starts only after fetch k resolved.
    async fn run_sequential(
        &self,
        round: RoundId,
        request_id: RequestId,
        selection: &ModelSelection,
        events: EventSink<'_>,
        progress: &dyn PipelineProgressNotifier,
    ) -> RoundOutcome {
        let mut outcome = RoundOutcome::start(selection);

        for model in selection {
            outcome.loading(model);
            events(PipelineEvent::ModelLoading {
                round,
                model: model.clone(),
            });
            progress.on_model_start(model);

            let result = fetch(self.gateway.as_ref(), request_id, model).await;
            Self::resolve(&mut outcome, round, model, result, events, progress);
        }

        outcome
    }

    /// All fetches in flight together; results applied in arrival order.
    async fn run_concurrent(
        &self,
        round: RoundId,
        request_id: RequestId,
        selection: &ModelSelection,
        events: EventSink<'_>,
        progress: &dyn PipelineProgressNotifier,
    ) -> RoundOutcome {
        let mut outcome = RoundOutcome::start(selection);
        let mut join_set = JoinSet::new();

        for model in selection {
            outcome.loading(model);
            events(PipelineEvent::ModelLoading {
                round,
                model: model.clone(),
            });
            progress.on_model_start(model);

            let gateway = Arc::clone(&self.gateway);
            let model = model.clone();
            join_set.spawn(async move {
                let result = fetch(gateway.as_ref(), request_id, &model).await;
                (model, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((model, result)) => {
                    Self::resolve(&mut outcome, round, &model, result, events, progress);
                }
                Err(e) => {
                    warn!("Model fetch task failed: {}", e);
                }
            }
        }

        // A task that panicked never reported back; close its entry.
        let unresolved: Vec<ModelName> = outcome
            .results
            .iter()
            .filter(|(_, r)| !r.is_terminal())
            .map(|(m, _)| m.clone())
            .collect();
        for model in unresolved {
            let result = ModelResult::error(GENERIC_ERROR_MESSAGE);
            Self::resolve(&mut outcome, round, &model, result, events, progress);
        }

        outcome
    }

    fn resolve(
        outcome: &mut RoundOutcome,
        round: RoundId,
        model: &ModelName,
        result: ModelResult,
        events: EventSink<'_>,
        progress: &dyn PipelineProgressNotifier,
    ) {
        progress.on_model_complete(model, &result);
        outcome.resolve(model, result.clone());
        events(PipelineEvent::ModelResolved {
            round,
            model: model.clone(),
            result,
        });
    }
}

/// Fetch one model's response and map it to a terminal result
async fn fetch<G: BackendGateway + ?Sized>(
    gateway: &G,
    request_id: RequestId,
    model: &ModelName,
) -> ModelResult {
    debug!("Fetching response from {} for request {}", model, request_id);
    match gateway.get_model_response(request_id, model).await {
        Ok(reply) => {
            info!("Model {} responded successfully", model);
            ModelResult::success(reply.output, reply.optimized_prompt_used)
        }
        Err(e) => {
            warn!("Model {} failed: {}", model, e);
            ModelResult::error(e.user_message())
        }
    }
}
