//! Persisted request records as returned by the backend

use crate::questionnaire::QuestionnaireAnswer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted request in the history list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSummary {
    pub id: i64,
    pub base_prompt: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// One stored model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutputRecord {
    pub model_name: String,
    pub output: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Full persisted request: answers and every recorded model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDetail {
    pub id: i64,
    pub base_prompt: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub questionnaire_responses: Vec<QuestionnaireAnswer>,
    #[serde(default)]
    pub model_outputs: Vec<ModelOutputRecord>,
}

impl PromptDetail {
    /// Model outputs, newest first
    pub fn outputs_newest_first(&self) -> Vec<&ModelOutputRecord> {
        let mut outputs: Vec<_> = self.model_outputs.iter().collect();
        outputs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        outputs
    }
}

/// Timestamps arrive either with an offset (RFC 3339) or as naive
/// date-times, which are taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
