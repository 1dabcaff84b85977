//! Request value objects and entity

use super::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user's raw natural-language request (Value Object)
///
/// Never blank. The text itself is kept as typed; only the blank check trims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseText {
    content: String,
}

impl BaseText {
    /// Try to create a base text, returning None if blank
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for BaseText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for BaseText {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BaseText::try_new(value).ok_or(DomainError::BlankBaseText)
    }
}

impl From<BaseText> for String {
    fn from(value: BaseText) -> Self {
        value.content
    }
}

/// Identifier assigned by the backend when a request is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(i64);

impl RequestId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RequestId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(RequestId)
            .map_err(|_| DomainError::InvalidRequestId(s.to_string()))
    }
}

/// The request driven through one pipeline run (Entity)
///
/// `id` stays `None` until the questionnaire has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    id: Option<RequestId>,
    base_text: BaseText,
    created_at: DateTime<Utc>,
}

impl Request {
    pub fn new(base_text: BaseText) -> Self {
        Self::with_created_at(base_text, Utc::now())
    }

    pub fn with_created_at(base_text: BaseText, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            base_text,
            created_at,
        }
    }

    pub fn id(&self) -> Option<RequestId> {
        self.id
    }

    pub fn base_text(&self) -> &BaseText {
        &self.base_text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Attach the backend-assigned id.
    pub fn persisted(mut self, id: RequestId) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_text_rejects_blank() {
        assert!(BaseText::try_new("").is_none());
        assert!(BaseText::try_new(" \n\t ").is_none());
    }

    #[test]
    fn test_base_text_keeps_original_text() {
        let text = BaseText::try_new("  Explain quantum computing ").unwrap();
        assert_eq!(text.content(), "  Explain quantum computing ");
    }

    #[test]
    fn test_base_text_deserialize_rejects_blank() {
        assert!(serde_json::from_str::<BaseText>("\"   \"").is_err());
    }

    #[test]
    fn test_request_id_parse() {
        assert_eq!("123".parse::<RequestId>().unwrap(), RequestId::new(123));
        assert!("abc".parse::<RequestId>().is_err());
    }

    #[test]
    fn test_request_starts_without_id() {
        let request = Request::new(BaseText::try_new("hello").unwrap());
        assert_eq!(request.id(), None);
        let request = request.persisted(RequestId::new(7));
        assert_eq!(request.id(), Some(RequestId::new(7)));
    }
}
