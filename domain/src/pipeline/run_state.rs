//! The run aggregate and its transition function.
//!
//! [`RunState`] is an immutable value: every change goes through
//! [`RunState::apply`], which consumes the old state and returns the next
//! one. Events that do not fit the current state are ignored, which is how
//! late results from a superseded round are discarded.

use super::model_result::{ModelResult, ModelResults};
use super::stage::Stage;
use crate::core::model::{ModelName, ModelSelection};
use crate::core::request::{Request, RequestId};
use crate::questionnaire::{ClarifyingQuestions, QuestionnaireAnswer};
use serde::{Deserialize, Serialize};

/// Identifies one model-selection round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(u64);

impl RoundId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything that can happen to a run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A stage-blocking error to show as the page banner
    ErrorRaised(String),
    /// The banner was dismissed, or a new action started
    ErrorCleared,
    /// Questions generated for a new base request; starts a new run
    QuestionsGenerated {
        request: Request,
        questions: ClarifyingQuestions,
    },
    /// Request and answers persisted; later-stage data is now stale
    AnswersPersisted {
        id: RequestId,
        answers: Vec<QuestionnaireAnswer>,
    },
    RecommendationsRequested,
    RecommendationsReceived(Vec<ModelName>),
    /// Move forward to `Stage`; never moves backwards
    StageAdvanced(Stage),
    /// A new round replaces all previous results
    RoundStarted {
        round: RoundId,
        selection: ModelSelection,
    },
    ModelLoading {
        round: RoundId,
        model: ModelName,
    },
    /// Terminal result for one model
    ModelResolved {
        round: RoundId,
        model: ModelName,
        result: ModelResult,
    },
    RoundFinished {
        round: RoundId,
    },
}

/// Aggregate state of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunState {
    stage: Stage,
    request: Option<Request>,
    questions: ClarifyingQuestions,
    answers: Vec<QuestionnaireAnswer>,
    recommendations: Vec<ModelName>,
    recommendations_loading: bool,
    results: ModelResults,
    optimized_prompt_for_display: Option<String>,
    page_error: Option<String>,
    active_round: Option<RoundId>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    pub fn request_id(&self) -> Option<RequestId> {
        self.request.as_ref().and_then(|r| r.id())
    }

    pub fn questions(&self) -> &ClarifyingQuestions {
        &self.questions
    }

    pub fn answers(&self) -> &[QuestionnaireAnswer] {
        &self.answers
    }

    pub fn recommendations(&self) -> &[ModelName] {
        &self.recommendations
    }

    pub fn recommendations_loading(&self) -> bool {
        self.recommendations_loading
    }

    pub fn results(&self) -> &ModelResults {
        &self.results
    }

    pub fn optimized_prompt_for_display(&self) -> Option<&str> {
        self.optimized_prompt_for_display.as_deref()
    }

    pub fn page_error(&self) -> Option<&str> {
        self.page_error.as_deref()
    }

    pub fn active_round(&self) -> Option<RoundId> {
        self.active_round
    }

    /// True from the start of a round until its last model resolves
    pub fn is_fetching(&self) -> bool {
        self.active_round.is_some()
    }

    fn is_current_round(&self, round: RoundId) -> bool {
        self.active_round == Some(round)
    }

    /// Compute the next state.
    pub fn apply(self, event: PipelineEvent) -> RunState {
        match event {
            PipelineEvent::ErrorRaised(message) => RunState {
                page_error: Some(message),
                ..self
            },
            PipelineEvent::ErrorCleared => RunState {
                page_error: None,
                ..self
            },
            PipelineEvent::QuestionsGenerated { request, questions } => RunState {
                stage: Stage::Questionnaire,
                request: Some(request),
                questions,
                ..RunState::default()
            },
            PipelineEvent::AnswersPersisted { id, answers } => {
                if self.request.is_none() {
                    return self;
                }
                RunState {
                    stage: self.stage,
                    request: self.request.map(|r| r.persisted(id)),
                    questions: self.questions,
                    answers,
                    page_error: self.page_error,
                    ..RunState::default()
                }
            }
            PipelineEvent::RecommendationsRequested => RunState {
                recommendations: Vec::new(),
                recommendations_loading: true,
                ..self
            },
            PipelineEvent::RecommendationsReceived(models) => RunState {
                recommendations: models,
                recommendations_loading: false,
                ..self
            },
            PipelineEvent::StageAdvanced(stage) => RunState {
                stage: self.stage.max(stage),
                ..self
            },
            PipelineEvent::RoundStarted { round, selection } => RunState {
                results: ModelResults::pending_for(&selection),
                optimized_prompt_for_display: None,
                active_round: Some(round),
                ..self
            },
            PipelineEvent::ModelLoading { round, model } => {
                if !self.is_current_round(round) {
                    return self;
                }
                let mut results = self.results;
                results.update(&model, ModelResult::Loading);
                RunState { results, ..self }
            }
            PipelineEvent::ModelResolved {
                round,
                model,
                result,
            } => {
                if !self.is_current_round(round) || !result.is_terminal() {
                    return self;
                }
                let mut results = self.results;
                results.update(&model, result);
                let optimized_prompt_for_display = self
                    .optimized_prompt_for_display
                    .or_else(|| results.decided_optimized_prompt().map(str::to_string));
                RunState {
                    results,
                    optimized_prompt_for_display,
                    ..self
                }
            }
            PipelineEvent::RoundFinished { round } => {
                if !self.is_current_round(round) {
                    return self;
                }
                RunState {
                    active_round: None,
                    ..self
                }
            }
        }
    }
}
