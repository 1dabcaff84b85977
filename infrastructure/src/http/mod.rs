//! HTTP adapter for the prompt backend
//!
//! Implements BackendGateway over the backend's JSON API.

pub mod gateway;
pub mod protocol;
