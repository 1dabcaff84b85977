//! Stage controller
//!
//! Top-level state machine of a pipeline run. It sequences the
//! questionnaire, recommendation and model-response stages, records
//! stage-blocking errors as the page error, and is the only writer of the
//! [`RunState`].
//!
//! State lives in a `watch` channel: every transition replaces the whole
//! value, so subscribers can render progressively.

use crate::config::PipelineConfig;
use crate::ports::backend::{BackendError, BackendGateway};
use crate::ports::progress::{NoProgress, PipelineProgressNotifier};
use crate::use_cases::model_round::ModelResponseCoordinator;
use crate::use_cases::questionnaire::QuestionnaireStage;
use crate::use_cases::recommend::RecommendationStage;
use forge_domain::{
    BaseText, ModelName, ModelSelection, PipelineEvent, Request, RequestId, RoundId, RoundSummary,
    RunState, Stage, align_answers,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Stage-blocking errors. Each is also recorded as the page error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("Failed to generate questionnaire. Please try again. Details: {}", .0.user_message())]
    QuestionGeneration(BackendError),

    #[error("Failed to submit questionnaire. Please try again. Details: {}", .0.user_message())]
    Persistence(BackendError),

    #[error("There is no questionnaire to answer. Submit a base request first.")]
    NoQuestionnaire,

    #[error("Cannot get model responses without a submitted prompt ID.")]
    NotPersisted,

    #[error("Model selection is not available until the questionnaire has been submitted.")]
    SelectionUnavailable,

    #[error("Model responses are still being fetched. Wait for the current round to finish.")]
    RoundInFlight,

    #[error("Select at least one model.")]
    EmptySelection,
}

/// Use case driving a whole pipeline run
pub struct StageController<G: BackendGateway + ?Sized + 'static> {
    questionnaire: QuestionnaireStage<G>,
    recommendations: RecommendationStage<G>,
    coordinator: ModelResponseCoordinator<G>,
    state: watch::Sender<RunState>,
    last_round: AtomicU64,
    progress: Arc<dyn PipelineProgressNotifier>,
}

impl<G: BackendGateway + ?Sized + 'static> StageController<G> {
    pub fn new(gateway: Arc<G>, config: PipelineConfig) -> Self {
        let (state, _) = watch::channel(RunState::new());
        Self {
            questionnaire: QuestionnaireStage::new(Arc::clone(&gateway)),
            recommendations: RecommendationStage::new(Arc::clone(&gateway)),
            coordinator: ModelResponseCoordinator::new(gateway, config.round_strategy),
            state,
            last_round: AtomicU64::new(0),
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn PipelineProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    /// Snapshot of the current run state
    pub fn state(&self) -> RunState {
        self.state.borrow().clone()
    }

    /// Watch every state transition
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Clear the page error banner
    pub fn dismiss_error(&self) {
        self.dispatch(PipelineEvent::ErrorCleared);
    }

    fn dispatch(&self, event: PipelineEvent) {
        self.state
            .send_modify(|state| *state = std::mem::take(state).apply(event));
    }

    fn fail(&self, error: StageError) -> StageError {
        warn!("{}", error);
        self.dispatch(PipelineEvent::ErrorRaised(error.to_string()));
        error
    }

    /// Apply `events` in one transition unless a round is in flight.
    fn dispatch_when_idle(&self, events: impl IntoIterator<Item = PipelineEvent>) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_fetching() {
                return false;
            }
            *state = events
                .into_iter()
                .fold(std::mem::take(state), RunState::apply);
            true
        })
    }

    fn advance(&self, stage: Stage) {
        self.dispatch(PipelineEvent::StageAdvanced(stage));
        self.report_stage(stage);
    }

    fn report_stage(&self, stage: Stage) {
        info!("Advanced to stage {}", stage);
        self.progress.on_stage_change(stage);
    }

    /// Submit the base request and generate clarifying questions.
    ///
    /// Blank text is ignored without touching the backend or the state.
    /// On success a new run begins at the questionnaire stage. Refused
    /// while a model round is in flight.
    pub async fn submit_base_request(&self, text: &str) -> Result<(), StageError> {
        let Some(base_text) = BaseText::try_new(text) else {
            debug!("Ignoring blank base request");
            return Ok(());
        };
        if self.state.borrow().is_fetching() {
            return Err(self.fail(StageError::RoundInFlight));
        }

        self.dispatch(PipelineEvent::ErrorCleared);
        let questions = self
            .questionnaire
            .generate(&base_text)
            .await
            .map_err(|e| self.fail(StageError::QuestionGeneration(e)))?;

        let started = PipelineEvent::QuestionsGenerated {
            request: Request::new(base_text),
            questions,
        };
        if !self.dispatch_when_idle([started]) {
            return Err(self.fail(StageError::RoundInFlight));
        }
        self.report_stage(Stage::Questionnaire);
        Ok(())
    }

    /// Submit answers, persist the request and fetch recommendations.
    ///
    /// Answers are matched to questions by position; missing ones are empty.
    /// Refused while a model round is in flight.
    pub async fn submit_answers(&self, answers: Vec<String>) -> Result<(), StageError> {
        let snapshot = self.state();
        let request = match snapshot.request() {
            Some(request) if snapshot.stage() >= Stage::Questionnaire => request.clone(),
            _ => return Err(self.fail(StageError::NoQuestionnaire)),
        };
        if snapshot.is_fetching() {
            return Err(self.fail(StageError::RoundInFlight));
        }
        let base_text = request.base_text().clone();
        let answers = align_answers(snapshot.questions(), answers);

        self.dispatch(PipelineEvent::ErrorCleared);
        let persisted = self
            .questionnaire
            .persist(&base_text, &answers)
            .await
            .map_err(|e| self.fail(StageError::Persistence(e)))?;

        if self.state.borrow().request() != Some(&request) {
            debug!("Run was replaced while persisting; dropping request {}", persisted.id);
            return Ok(());
        }

        let persisted_events = [
            PipelineEvent::AnswersPersisted {
                id: persisted.id,
                answers: answers.clone(),
            },
            PipelineEvent::RecommendationsRequested,
        ];
        if !self.dispatch_when_idle(persisted_events) {
            return Err(self.fail(StageError::RoundInFlight));
        }

        let recommendation = self
            .recommendations
            .recommend(persisted.id, &base_text, &answers)
            .await;
        self.dispatch(PipelineEvent::RecommendationsReceived(recommendation.models));

        self.advance(Stage::ModelSelectionAndResults);
        Ok(())
    }

    /// Fetch one response per selected model, in the given order.
    ///
    /// Only available once answers are submitted and recommendations have
    /// settled. Per-model failures stay inside their own result; only a
    /// refused round is returned as an error.
    pub async fn select_models(&self, models: Vec<ModelName>) -> Result<RoundSummary, StageError> {
        if self.state().request_id().is_none() {
            return Err(self.fail(StageError::NotPersisted));
        }
        let selection =
            ModelSelection::new(models).map_err(|_| self.fail(StageError::EmptySelection))?;

        let round = RoundId::new(self.last_round.fetch_add(1, Ordering::SeqCst) + 1);
        let request_id = self
            .try_start_round(round, &selection)
            .map_err(|e| self.fail(e))?;

        let sink = |event: PipelineEvent| self.dispatch(event);
        let outcome = self
            .coordinator
            .run_round(round, request_id, &selection, &sink, self.progress.as_ref())
            .await;
        self.dispatch(PipelineEvent::RoundFinished { round });

        let summary = RoundSummary::from_results(
            round,
            &outcome.results,
            outcome.optimized_prompt.as_deref(),
        );
        self.progress.on_round_complete(&summary);
        Ok(summary)
    }

    /// Atomically check the round preconditions and start `round`.
    fn try_start_round(
        &self,
        round: RoundId,
        selection: &ModelSelection,
    ) -> Result<RequestId, StageError> {
        let mut outcome = Err(StageError::NotPersisted);
        self.state.send_if_modified(|state| {
            outcome = round_precondition(state);
            if outcome.is_err() {
                return false;
            }
            *state = std::mem::take(state)
                .apply(PipelineEvent::ErrorCleared)
                .apply(PipelineEvent::RoundStarted {
                    round,
                    selection: selection.clone(),
                });
            true
        });
        outcome
    }
}

fn round_precondition(state: &RunState) -> Result<RequestId, StageError> {
    let request_id = state.request_id().ok_or(StageError::NotPersisted)?;
    if state.stage() != Stage::ModelSelectionAndResults || state.recommendations_loading() {
        return Err(StageError::SelectionUnavailable);
    }
    if state.is_fetching() {
        return Err(StageError::RoundInFlight);
    }
    Ok(request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::backend::{ModelReply, Page};
    use async_trait::async_trait;
    use forge_domain::{
        ClarifyingQuestions, ModelResult, PromptDetail, PromptSummary, QuestionnaireAnswer,
        RoundStrategy,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    // === Mock implementations ===

    /// Gateway answering from fixed scripts and recording every call
    struct ScriptedGateway {
        questions: Result<Vec<String>, BackendError>,
        persist: Result<i64, BackendError>,
        recommend: Result<Vec<String>, BackendError>,
        replies: HashMap<String, Result<ModelReply, BackendError>>,
        delays: HashMap<String, Duration>,
        gate: Option<Arc<Notify>>,
        recommend_gate: Option<Arc<Notify>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn new() -> Self {
            Self {
                questions: Ok(vec!["Q1".to_string(), "Q2".to_string()]),
                persist: Ok(123),
                recommend: Ok(vec!["GPT-X".to_string(), "Claude-Y".to_string()]),
                replies: HashMap::new(),
                delays: HashMap::new(),
                gate: None,
                recommend_gate: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_reply(mut self, model: &str, output: &str, optimized: Option<&str>) -> Self {
            self.replies.insert(
                model.to_string(),
                Ok(ModelReply::new(output, optimized.map(str::to_string))),
            );
            self
        }

        fn with_failure(mut self, model: &str, detail: &str) -> Self {
            self.replies
                .insert(model.to_string(), Err(BackendError::api(502, detail)));
            self
        }

        fn with_delay(mut self, model: &str, millis: u64) -> Self {
            self.delays
                .insert(model.to_string(), Duration::from_millis(millis));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn record_for(id: i64, base_text: &BaseText, answers: &[QuestionnaireAnswer]) -> PromptDetail {
        PromptDetail {
            id,
            base_prompt: base_text.content().to_string(),
            timestamp: chrono::Utc::now(),
            questionnaire_responses: answers.to_vec(),
            model_outputs: vec![],
        }
    }

    #[async_trait]
    impl BackendGateway for ScriptedGateway {
        async fn generate_questions(
            &self,
            base_text: &BaseText,
        ) -> Result<ClarifyingQuestions, BackendError> {
            self.record(format!("generate:{}", base_text));
            self.questions.clone().map(ClarifyingQuestions::new)
        }

        async fn persist_request(
            &self,
            base_text: &BaseText,
            answers: &[QuestionnaireAnswer],
        ) -> Result<PromptDetail, BackendError> {
            self.record(format!("persist:{}", answers.len()));
            self.persist
                .clone()
                .map(|id| record_for(id, base_text, answers))
        }

        async fn recommend_models(
            &self,
            request_id: RequestId,
            _base_text: &BaseText,
            _answers: &[QuestionnaireAnswer],
        ) -> Result<Vec<ModelName>, BackendError> {
            self.record(format!("recommend:{}", request_id));
            if let Some(gate) = &self.recommend_gate {
                gate.notified().await;
            }
            self.recommend.clone().map(|names| {
                names
                    .into_iter()
                    .map(|n| ModelName::new(n).unwrap())
                    .collect()
            })
        }

        async fn get_model_response(
            &self,
            request_id: RequestId,
            model: &ModelName,
        ) -> Result<ModelReply, BackendError> {
            self.record(format!("fetch:{}:{}", request_id, model));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(delay) = self.delays.get(model.as_str()) {
                tokio::time::sleep(*delay).await;
            }
            self.replies
                .get(model.as_str())
                .cloned()
                .unwrap_or_else(|| Ok(ModelReply::new(format!("out:{}", model), None)))
        }

        async fn list_history(&self, _page: Page) -> Result<Vec<PromptSummary>, BackendError> {
            Ok(vec![])
        }

        async fn get_history_detail(&self, id: RequestId) -> Result<PromptDetail, BackendError> {
            Err(BackendError::api(404, format!("Prompt {} not found", id)))
        }
    }

    /// Records progress callbacks in order
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl PipelineProgressNotifier for RecordingProgress {
        fn on_stage_change(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("stage:{:?}", stage));
        }

        fn on_round_start(&self, total_models: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("round:{}", total_models));
        }

        fn on_model_start(&self, model: &ModelName) {
            self.events.lock().unwrap().push(format!("start:{}", model));
        }

        fn on_model_complete(&self, model: &ModelName, result: &ModelResult) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done:{}:{}", model, result.status()));
        }

        fn on_round_complete(&self, summary: &RoundSummary) {
            self.events
                .lock()
                .unwrap()
                .push(format!("complete:{}/{}", summary.succeeded, summary.total));
        }
    }

    fn name(s: &str) -> ModelName {
        ModelName::new(s).unwrap()
    }

    fn names(list: &[&str]) -> Vec<ModelName> {
        list.iter().map(|s| name(s)).collect()
    }

    fn controller(gateway: ScriptedGateway) -> (StageController<ScriptedGateway>, Arc<ScriptedGateway>) {
        let gateway = Arc::new(gateway);
        (
            StageController::new(Arc::clone(&gateway), PipelineConfig::default()),
            gateway,
        )
    }

    async fn at_model_selection(controller: &StageController<ScriptedGateway>) {
        controller
            .submit_base_request("Explain quantum computing")
            .await
            .unwrap();
        controller
            .submit_answers(vec!["A1".to_string(), "A2".to_string()])
            .await
            .unwrap();
    }

    // === Base request ===

    #[tokio::test]
    async fn test_blank_base_request_is_noop() {
        let (controller, gateway) = controller(ScriptedGateway::new());
        controller.submit_base_request("   \n ").await.unwrap();

        assert!(gateway.calls().is_empty());
        assert_eq!(controller.state(), RunState::new());
    }

    #[tokio::test]
    async fn test_base_request_advances_to_questionnaire() {
        let (controller, _) = controller(ScriptedGateway::new());
        controller
            .submit_base_request("Explain quantum computing")
            .await
            .unwrap();

        let state = controller.state();
        assert_eq!(state.stage(), Stage::Questionnaire);
        assert_eq!(state.questions().as_slice(), &["Q1", "Q2"]);
        assert_eq!(
            state.request().unwrap().base_text().content(),
            "Explain quantum computing"
        );
        assert_eq!(state.request_id(), None);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_stage_and_sets_error() {
        let mut gateway = ScriptedGateway::new();
        gateway.questions = Err(BackendError::api(500, "model overloaded"));
        let (controller, _) = controller(gateway);

        let err = controller
            .submit_base_request("Explain quantum computing")
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::QuestionGeneration(_)));
        let state = controller.state();
        assert_eq!(state.stage(), Stage::CollectingRequest);
        assert_eq!(
            state.page_error(),
            Some("Failed to generate questionnaire. Please try again. Details: model overloaded")
        );
    }

    #[tokio::test]
    async fn test_resubmitting_base_request_discards_later_data() {
        let (controller, _) = controller(ScriptedGateway::new());
        at_model_selection(&controller).await;
        controller
            .select_models(names(&["GPT-X"]))
            .await
            .unwrap();

        controller.submit_base_request("Something else").await.unwrap();
        let state = controller.state();
        assert_eq!(state.stage(), Stage::Questionnaire);
        assert!(state.results().is_empty());
        assert!(state.recommendations().is_empty());
        assert_eq!(state.optimized_prompt_for_display(), None);
    }

    // === Answers ===

    #[tokio::test]
    async fn test_answers_persist_and_advance() {
        let (controller, gateway) = controller(ScriptedGateway::new());
        at_model_selection(&controller).await;

        let state = controller.state();
        assert_eq!(state.stage(), Stage::ModelSelectionAndResults);
        assert_eq!(state.request_id(), Some(RequestId::new(123)));
        assert_eq!(state.recommendations(), names(&["GPT-X", "Claude-Y"]).as_slice());
        assert!(!state.recommendations_loading());
        assert_eq!(
            gateway.calls(),
            vec![
                "generate:Explain quantum computing".to_string(),
                "persist:2".to_string(),
                "recommend:123".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_answers_default_to_empty() {
        let (controller, _) = controller(ScriptedGateway::new());
        controller.submit_base_request("Explain").await.unwrap();
        controller
            .submit_answers(vec!["A1".to_string()])
            .await
            .unwrap();

        let answers = controller.state().answers().to_vec();
        assert_eq!(
            answers,
            vec![
                QuestionnaireAnswer::new("Q1", "A1"),
                QuestionnaireAnswer::new("Q2", ""),
            ]
        );
    }

    #[tokio::test]
    async fn test_answers_before_questions_rejected() {
        let (controller, gateway) = controller(ScriptedGateway::new());
        let err = controller.submit_answers(vec![]).await.unwrap_err();

        assert_eq!(err, StageError::NoQuestionnaire);
        assert!(gateway.calls().is_empty());
        assert!(controller.state().page_error().is_some());
    }

    /// Scenario C: persistence fails
    #[tokio::test]
    async fn test_persist_failure_blocks_and_skips_recommendations() {
        let mut gateway = ScriptedGateway::new();
        gateway.persist = Err(BackendError::api(500, "database locked"));
        let (controller, gateway) = controller(gateway);

        controller.submit_base_request("Explain").await.unwrap();
        let err = controller
            .submit_answers(vec!["A1".to_string(), "A2".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::Persistence(_)));
        let state = controller.state();
        assert_eq!(state.stage(), Stage::Questionnaire);
        assert_eq!(state.request_id(), None);
        assert!(state.page_error().unwrap().contains("database locked"));
        assert!(!gateway.calls().iter().any(|c| c.starts_with("recommend")));
    }

    #[tokio::test]
    async fn test_recommendation_failure_does_not_block() {
        let mut gateway = ScriptedGateway::new();
        gateway.recommend = Err(BackendError::Timeout);
        let (controller, _) = controller(gateway);

        at_model_selection(&controller).await;

        let state = controller.state();
        assert_eq!(state.stage(), Stage::ModelSelectionAndResults);
        assert!(state.recommendations().is_empty());
        assert_eq!(state.page_error(), None);
    }

    // === Model selection ===

    #[tokio::test]
    async fn test_select_before_persistence_rejected() {
        let (controller, gateway) = controller(ScriptedGateway::new());
        controller.submit_base_request("Explain").await.unwrap();

        let err = controller
            .select_models(names(&["GPT-X"]))
            .await
            .unwrap_err();

        assert_eq!(err, StageError::NotPersisted);
        assert_eq!(
            controller.state().page_error(),
            Some("Cannot get model responses without a submitted prompt ID.")
        );
        assert!(!gateway.calls().iter().any(|c| c.starts_with("fetch")));
    }

    #[tokio::test]
    async fn test_empty_selection_rejected() {
        let (controller, _) = controller(ScriptedGateway::new());
        at_model_selection(&controller).await;

        let err = controller.select_models(vec![]).await.unwrap_err();
        assert_eq!(err, StageError::EmptySelection);
        assert!(controller.state().results().is_empty());
    }

    /// Scenario A: first model succeeds, second fails
    #[tokio::test]
    async fn test_scenario_first_succeeds_second_fails() {
        let gateway = ScriptedGateway::new()
            .with_reply("GPT-X", "out1", Some("opt1"))
            .with_failure("Claude-Y", "timeout");
        let (controller, _) = controller(gateway);
        at_model_selection(&controller).await;

        let summary = controller
            .select_models(names(&["GPT-X", "Claude-Y"]))
            .await
            .unwrap();

        let state = controller.state();
        assert_eq!(
            state.results().get(&name("GPT-X")),
            Some(&ModelResult::success("out1", Some("opt1".to_string())))
        );
        assert_eq!(
            state.results().get(&name("Claude-Y")),
            Some(&ModelResult::error("timeout"))
        );
        assert_eq!(state.optimized_prompt_for_display(), Some("opt1"));
        assert!(!state.is_fetching());
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.optimized_prompt.as_deref(), Some("opt1"));
    }

    /// Scenario B: first model fails, second succeeds
    #[tokio::test]
    async fn test_scenario_first_fails_second_succeeds() {
        let gateway = ScriptedGateway::new()
            .with_failure("GPT-X", "rate limited")
            .with_reply("Claude-Y", "out2", Some("opt2"));
        let (controller, _) = controller(gateway);
        at_model_selection(&controller).await;

        controller
            .select_models(names(&["GPT-X", "Claude-Y"]))
            .await
            .unwrap();

        let state = controller.state();
        assert_eq!(state.optimized_prompt_for_display(), Some("opt2"));
        assert_eq!(
            state.results().get(&name("GPT-X")).unwrap().error_message(),
            Some("rate limited")
        );
    }

    #[tokio::test]
    async fn test_no_optimized_prompt_when_none_reported() {
        let gateway = ScriptedGateway::new()
            .with_reply("GPT-X", "out1", Some(""))
            .with_failure("Claude-Y", "boom");
        let (controller, _) = controller(gateway);
        at_model_selection(&controller).await;

        controller
            .select_models(names(&["GPT-X", "Claude-Y"]))
            .await
            .unwrap();
        assert_eq!(controller.state().optimized_prompt_for_display(), None);
    }

    #[tokio::test]
    async fn test_result_keys_match_selection_exactly() {
        let (controller, _) = controller(ScriptedGateway::new());
        at_model_selection(&controller).await;

        controller
            .select_models(names(&["C", "A", "B", "A"]))
            .await
            .unwrap();

        let keys: Vec<_> = controller
            .state()
            .results()
            .models()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(keys, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_model() {
        let (controller, _) = controller(ScriptedGateway::new());
        at_model_selection(&controller).await;
        controller
            .select_models(names(&["A", "B", "C"]))
            .await
            .unwrap();
        let baseline = controller.state();

        let gateway = ScriptedGateway::new().with_failure("B", "down");
        let (failing, _) = self::controller(gateway);
        at_model_selection(&failing).await;
        failing
            .select_models(names(&["A", "B", "C"]))
            .await
            .unwrap();
        let state = failing.state();

        for model in ["A", "C"] {
            assert_eq!(
                state.results().get(&name(model)),
                baseline.results().get(&name(model))
            );
        }
        assert_eq!(state.page_error(), None);
    }

    #[tokio::test]
    async fn test_sequential_round_fetches_in_order() {
        let gateway = ScriptedGateway::new()
            .with_delay("slow", 50)
            .with_reply("slow", "s", Some("opt-slow"));
        let gateway = Arc::new(gateway);
        let progress = Arc::new(RecordingProgress::default());
        let controller = StageController::new(Arc::clone(&gateway), PipelineConfig::default())
            .with_progress(progress.clone());
        at_model_selection(&controller).await;

        controller
            .select_models(names(&["slow", "fast"]))
            .await
            .unwrap();

        let fetches: Vec<_> = gateway
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("fetch"))
            .collect();
        assert_eq!(fetches, vec!["fetch:123:slow", "fetch:123:fast"]);
        assert_eq!(
            progress.events.lock().unwrap().clone(),
            vec![
                "stage:Questionnaire",
                "stage:ModelSelectionAndResults",
                "round:2",
                "start:slow",
                "done:slow:success",
                "start:fast",
                "done:fast:success",
                "complete:2/2",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_round_picks_prompt_by_selection_order() {
        let gateway = ScriptedGateway::new()
            .with_delay("first", 500)
            .with_reply("first", "o1", Some("opt-first"))
            .with_delay("second", 10)
            .with_reply("second", "o2", Some("opt-second"));
        let gateway = Arc::new(gateway);
        let config = PipelineConfig::default().with_round_strategy(RoundStrategy::Concurrent);
        let controller = StageController::new(Arc::clone(&gateway), config);
        at_model_selection(&controller).await;

        let summary = controller
            .select_models(names(&["first", "second"]))
            .await
            .unwrap();

        assert_eq!(summary.optimized_prompt.as_deref(), Some("opt-first"));
        assert_eq!(
            controller.state().optimized_prompt_for_display(),
            Some("opt-first")
        );
        assert_eq!(summary.succeeded, 2);
    }

    #[tokio::test]
    async fn test_reselecting_resets_previous_results() {
        let gateway = ScriptedGateway::new()
            .with_reply("A", "a", Some("optA"))
            .with_failure("B", "down");
        let (controller, _) = controller(gateway);
        at_model_selection(&controller).await;
        controller.select_models(names(&["A"])).await.unwrap();
        assert_eq!(controller.state().optimized_prompt_for_display(), Some("optA"));

        let summary = controller.select_models(names(&["B"])).await.unwrap();

        let state = controller.state();
        assert_eq!(state.results().len(), 1);
        assert!(state.results().get(&name("A")).is_none());
        assert_eq!(state.optimized_prompt_for_display(), None);
        assert!(summary.all_failed());
        assert!(summary.round > RoundId::new(1));
    }

    #[tokio::test]
    async fn test_second_round_refused_while_first_in_flight() {
        let gate = Arc::new(Notify::new());
        let mut gateway = ScriptedGateway::new();
        gateway.gate = Some(Arc::clone(&gate));
        let gateway = Arc::new(gateway);
        let controller = Arc::new(StageController::new(
            Arc::clone(&gateway),
            PipelineConfig::default(),
        ));
        at_model_selection(&controller).await;

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.select_models(names(&["A"])).await })
        };

        let mut rx = controller.subscribe();
        rx.wait_for(|state| state.is_fetching()).await.unwrap();

        let err = controller
            .select_models(names(&["B"]))
            .await
            .unwrap_err();
        assert_eq!(err, StageError::RoundInFlight);

        gate.notify_one();
        let summary = first.await.unwrap().unwrap();
        assert_eq!(summary.total, 1);
        assert!(controller.state().results().get(&name("A")).unwrap().is_success());
    }

    #[tokio::test]
    async fn test_selection_refused_while_recommendations_load() {
        let recommend_gate = Arc::new(Notify::new());
        let mut gateway = ScriptedGateway::new();
        gateway.recommend_gate = Some(Arc::clone(&recommend_gate));
        let (controller, gateway) = controller(gateway);
        let controller = Arc::new(controller);
        controller.submit_base_request("Explain").await.unwrap();

        let submit = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                controller
                    .submit_answers(vec!["A1".to_string(), "A2".to_string()])
                    .await
            })
        };
        let mut rx = controller.subscribe();
        rx.wait_for(|state| state.recommendations_loading())
            .await
            .unwrap();
        assert_eq!(controller.state().stage(), Stage::Questionnaire);

        let err = controller
            .select_models(names(&["GPT-X"]))
            .await
            .unwrap_err();
        assert_eq!(err, StageError::SelectionUnavailable);
        assert!(!controller.state().is_fetching());

        recommend_gate.notify_one();
        submit.await.unwrap().unwrap();
        assert_eq!(controller.state().stage(), Stage::ModelSelectionAndResults);
        assert!(!gateway.calls().iter().any(|c| c.starts_with("fetch")));

        controller.select_models(names(&["GPT-X"])).await.unwrap();
        assert_eq!(
            gateway.calls().last().map(String::as_str),
            Some("fetch:123:GPT-X")
        );
    }

    #[tokio::test]
    async fn test_resubmission_refused_while_round_in_flight() {
        let gate = Arc::new(Notify::new());
        let mut gateway = ScriptedGateway::new();
        gateway.gate = Some(Arc::clone(&gate));
        let (controller, gateway) = controller(gateway);
        let controller = Arc::new(controller);
        at_model_selection(&controller).await;

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.select_models(names(&["A"])).await })
        };
        let mut rx = controller.subscribe();
        rx.wait_for(|state| state.is_fetching()).await.unwrap();

        let err = controller
            .submit_answers(vec!["A1".to_string(), "A2".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err, StageError::RoundInFlight);
        let err = controller
            .submit_base_request("Something else")
            .await
            .unwrap_err();
        assert_eq!(err, StageError::RoundInFlight);
        assert!(controller.state().is_fetching());

        let err = controller
            .select_models(names(&["B"]))
            .await
            .unwrap_err();
        assert_eq!(err, StageError::RoundInFlight);

        gate.notify_one();
        first.await.unwrap().unwrap();
        let fetches: Vec<_> = gateway
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("fetch"))
            .collect();
        assert_eq!(fetches, vec!["fetch:123:A".to_string()]);
        assert_eq!(gateway.calls().iter().filter(|c| c.starts_with("persist")).count(), 1);
        assert!(!controller.state().is_fetching());
    }

    #[tokio::test]
    async fn test_dismiss_error() {
        let (controller, _) = controller(ScriptedGateway::new());
        let _ = controller.select_models(names(&["A"])).await;
        assert!(controller.state().page_error().is_some());

        controller.dismiss_error();
        assert_eq!(controller.state().page_error(), None);
    }
}
