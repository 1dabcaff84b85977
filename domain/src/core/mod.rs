//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelName`] / [`model::ModelSelection`]: model display names and ordered selections
//! - [`request::Request`]: the request driven through one run
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod request;
pub mod string;
