//! Presentation layer for prompt-forge
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and interactive terminal prompts.

pub mod cli;
pub mod interactive;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use interactive::prompter::{InteractivePrompter, parse_model_choice};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
