//! Persisted-request history records

pub mod entities;

pub use entities::{ModelOutputRecord, PromptDetail, PromptSummary};
