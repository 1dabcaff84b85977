//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod history;
pub mod model_round;
pub mod questionnaire;
pub mod recommend;
pub mod stage_controller;
