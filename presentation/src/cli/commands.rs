//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the final run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Formatted console output with every model's result
    Full,
    /// JSON dump of the final run state
    Json,
}

impl From<OutputFormat> for forge_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => forge_domain::OutputFormat::Full,
            OutputFormat::Json => forge_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for prompt-forge
#[derive(Parser, Debug)]
#[command(name = "prompt-forge")]
#[command(author, version, about = "Refine a request through a questionnaire, then compare models")]
#[command(long_about = r#"
prompt-forge walks a request through three stages against the forge backend:

1. Base request: the backend generates clarifying questions
2. Questionnaire: your answers are persisted and models are recommended
3. Model selection: each selected model answers, one result per model

The optimized prompt shown is the one used by the first selected model that
succeeded with one.

Configuration files are loaded from (in priority order):
1. FORGE_* environment variables (e.g. FORGE_BACKEND__BASE_URL)
2. --config <path>     Explicit config file
3. ./forge.toml        Project-level config
4. ~/.config/prompt-forge/config.toml   Global config

Example:
  prompt-forge "Write a product announcement for our new API"
  prompt-forge -m "OpenAI GPT-4.1" -m "xAI Grok-3" "Explain quantum computing"
  prompt-forge --history
  prompt-forge --show 42 -o json
"#)]
pub struct Cli {
    /// The base request (prompted for when omitted)
    pub prompt: Option<String>,

    /// Models to query, in selection order (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// List previously submitted requests and exit
    #[arg(long, conflicts_with = "show")]
    pub history: bool,

    /// Show one stored request with its model outputs and exit
    #[arg(long, value_name = "ID")]
    pub show: Option<i64>,

    /// Output format (defaults to the configured one, else full)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Fetch all model responses of a round at once
    #[arg(long)]
    pub concurrent: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
