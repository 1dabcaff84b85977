//! CLI entrypoint for prompt-forge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use forge_application::{
    HistoryBrowser, NoProgress, Page, PipelineConfig, PipelineProgressNotifier, StageController,
};
use forge_domain::{ModelName, OutputFormat, RequestId, RoundStrategy, Stage};
use forge_infrastructure::{ConfigLoader, FileConfig, HttpBackendGateway};
use forge_presentation::{
    Cli, ConsoleFormatter, InteractivePrompter, ProgressReporter, SimpleProgress,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

type Controller = StageController<HttpBackendGateway>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    info!("Starting prompt-forge");

    let mut config = load_config(&cli)?;
    if cli.concurrent {
        config.models.round_strategy = RoundStrategy::Concurrent;
    }
    colored::control::set_override(config.output.color);

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let problems = config.validate();
    if !problems.is_empty() {
        let details: Vec<String> = problems.iter().map(|p| format!("  - {}", p)).collect();
        bail!("Invalid configuration:\n{}", details.join("\n"));
    }

    let format = config.output.resolve_format(cli.output.map(Into::into));

    // === Dependency Injection ===
    let gateway = Arc::new(HttpBackendGateway::new(&config.backend)?);
    info!("Using backend at {}", gateway.base_url());

    if cli.history {
        let prompts = HistoryBrowser::new(gateway)
            .list(Page::default())
            .await?;
        print_output(format, prompts.as_slice(), ConsoleFormatter::format_history);
        return Ok(());
    }

    if let Some(id) = cli.show {
        let detail = HistoryBrowser::new(gateway)
            .detail(RequestId::new(id))
            .await?;
        print_output(format, &detail, ConsoleFormatter::format_history_detail);
        return Ok(());
    }

    let progress: Arc<dyn PipelineProgressNotifier> = if cli.quiet {
        Arc::new(NoProgress)
    } else if config.output.progress {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(SimpleProgress)
    };
    let pipeline = PipelineConfig::default().with_round_strategy(config.models.round_strategy);
    let controller = StageController::new(gateway, pipeline).with_progress(progress);

    let mut prompter = InteractivePrompter::new();
    if run_pipeline(&cli, &config, &controller, &mut prompter).await? {
        let state = controller.state();
        print_output(format, &state, ConsoleFormatter::format);
    }

    Ok(())
}

/// Install the tracing subscriber; the guard must live until exit
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let (file_layer, guard) = match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("Failed to load configuration: {}", e))
}

fn print_output<T: serde::Serialize + ?Sized>(
    format: OutputFormat,
    value: &T,
    full: impl Fn(&T) -> String,
) {
    match format {
        OutputFormat::Full => println!("{}", full(value)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(value)),
    }
}

/// Drive one run through all three stages.
///
/// Returns `false` when the user cancelled before any model was queried.
async fn run_pipeline(
    cli: &Cli,
    config: &FileConfig,
    controller: &Controller,
    prompter: &mut InteractivePrompter,
) -> Result<bool> {
    // Stage 1: base request
    let mut base_request = match &cli.prompt {
        Some(prompt) => prompt.clone(),
        None => match prompter.read_base_request()? {
            Some(prompt) => prompt,
            None => return Ok(false),
        },
    };
    loop {
        match controller.submit_base_request(&base_request).await {
            Ok(()) if controller.state().stage() == Stage::CollectingRequest => {
                bail!("The base request cannot be blank")
            }
            Ok(()) => break,
            Err(e) => {
                eprintln!("{}", e);
                if !prompter.confirm("Try again?")? {
                    return Ok(false);
                }
                controller.dismiss_error();
                if cli.prompt.is_none() {
                    match prompter.read_base_request()? {
                        Some(prompt) => base_request = prompt,
                        None => return Ok(false),
                    }
                }
            }
        }
    }

    // Stage 2: questionnaire
    let questions = controller.state().questions().clone();
    let Some(mut answers) = prompter.ask_answers(&questions)? else {
        return Ok(false);
    };
    while let Err(e) = controller.submit_answers(answers.clone()).await {
        eprintln!("{}", e);
        if !prompter.confirm("Resubmit answers?")? {
            return Ok(false);
        }
        controller.dismiss_error();
        if prompter.confirm("Edit your answers first?")? {
            match prompter.ask_answers(&questions)? {
                Some(edited) => answers = edited,
                None => return Ok(false),
            }
        }
    }

    // Stage 3: model selection and results
    let (catalogue, rejected) = config.models.parse_available();
    if !rejected.is_empty() {
        warn!("Ignoring {} blank entries in models.available", rejected.len());
    }

    let mut selection = if cli.model.is_empty() {
        None
    } else {
        Some(
            cli.model
                .iter()
                .map(|name| ModelName::new(name.as_str()))
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    loop {
        let models = match selection.take() {
            Some(models) => models,
            None => {
                let recommended = controller.state().recommendations().to_vec();
                match prompter.choose_models(&catalogue, &recommended)? {
                    Some(models) => models,
                    None => return Ok(!controller.state().results().is_empty()),
                }
            }
        };

        match controller.select_models(models).await {
            Ok(summary) => println!("{}", ConsoleFormatter::format_round_summary(&summary)),
            Err(e) => eprintln!("{}", e),
        }

        if !cli.model.is_empty() || !prompter.confirm("Query a different set of models?")? {
            return Ok(true);
        }
        controller.dismiss_error();
    }
}
