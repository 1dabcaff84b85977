//! Model value objects: display names and ordered selections

use super::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display name of an external model endpoint (Value Object)
///
/// Names are free-form (the backend decides what it can serve) but never
/// blank, and always stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelName(String);

impl ModelName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyModelName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Models offered when no catalogue is configured
    pub fn default_catalogue() -> Vec<ModelName> {
        [
            "OpenAI GPT-4.1",
            "Anthropic Claude Sonnet 4",
            "xAI Grok-3",
            "Google Gemini 2.5 Pro",
        ]
        .into_iter()
        .map(|name| ModelName(name.to_string()))
        .collect()
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ModelName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::new(s)
    }
}

impl Serialize for ModelName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ModelName::new(s).map_err(serde::de::Error::custom)
    }
}

/// Ordered, duplicate-free, non-empty set of models chosen for a round
///
/// Order matters: it decides which optimized prompt is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSelection(Vec<ModelName>);

impl ModelSelection {
    /// Build a selection, dropping later duplicates.
    pub fn new(models: impl IntoIterator<Item = ModelName>) -> Result<Self, DomainError> {
        let mut unique: Vec<ModelName> = Vec::new();
        for model in models {
            if !unique.contains(&model) {
                unique.push(model);
            }
        }
        if unique.is_empty() {
            return Err(DomainError::EmptySelection);
        }
        Ok(Self(unique))
    }

    /// Parse raw names, rejecting blanks.
    pub fn parse<I, S>(names: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let models = names
            .into_iter()
            .map(|s| ModelName::new(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(models)
    }

    pub fn models(&self) -> &[ModelName] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelName> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ModelSelection {
    type Item = &'a ModelName;
    type IntoIter = std::slice::Iter<'a, ModelName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
