//! Questionnaire entities

use serde::{Deserialize, Serialize};

/// Ordered clarifying questions produced once per run
///
/// Immutable after generation; regenerating replaces the whole sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClarifyingQuestions(Vec<String>);

impl ClarifyingQuestions {
    pub fn new(questions: Vec<String>) -> Self {
        Self(questions)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

/// One answered question, positionally aligned with its question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireAnswer {
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl QuestionnaireAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.answer.trim().is_empty()
    }
}

/// Pair raw answers with their questions.
///
/// Missing answers become empty strings; answers beyond the last question
/// are dropped.
pub fn align_answers(
    questions: &ClarifyingQuestions,
    answers: impl IntoIterator<Item = String>,
) -> Vec<QuestionnaireAnswer> {
    let mut answers = answers.into_iter();
    questions
        .iter()
        .map(|question| {
            QuestionnaireAnswer::new(question.clone(), answers.next().unwrap_or_default())
        })
        .collect()
}
