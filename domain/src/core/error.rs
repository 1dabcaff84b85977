//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Base request cannot be blank")]
    BlankBaseText,

    #[error("Model name cannot be empty")]
    EmptyModelName,

    #[error("Select at least one model")]
    EmptySelection,

    #[error("Invalid request id: {0}")]
    InvalidRequestId(String),
}
