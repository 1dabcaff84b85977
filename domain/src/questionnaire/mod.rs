//! Questionnaire domain
//!
//! Clarifying questions generated from the base request, and the answers
//! collected for them before the request is persisted.

pub mod entities;

pub use entities::{ClarifyingQuestions, QuestionnaireAnswer, align_answers};
