//! Progress reporting for pipeline runs

use colored::Colorize;
use forge_application::ports::progress::PipelineProgressNotifier;
use forge_domain::{ModelName, ModelResult, RoundSummary, Stage};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports round progress with an indicatif progress bar
pub struct ProgressReporter {
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn outcome_mark(model: &ModelName, result: &ModelResult) -> String {
        if result.is_success() {
            format!("{} {}", "v".green(), model)
        } else {
            format!("{} {}", "x".red(), model)
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineProgressNotifier for ProgressReporter {
    fn on_stage_change(&self, stage: Stage) {
        eprintln!(
            "{} Step {}/3: {}",
            "->".cyan(),
            stage.step(),
            stage.display_name().bold()
        );
    }

    fn on_round_start(&self, total_models: usize) {
        let pb = ProgressBar::new(total_models as u64);
        pb.set_style(Self::round_style());
        pb.set_prefix("Model responses");
        pb.set_message("Starting...");
        pb.enable_steady_tick(std::time::Duration::from_millis(120));

        if let Ok(mut slot) = self.round_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_model_start(&self, model: &ModelName) {
        if let Ok(slot) = self.round_bar.lock() {
            if let Some(pb) = slot.as_ref() {
                pb.set_message(format!("waiting for {}", model));
            }
        }
    }

    fn on_model_complete(&self, model: &ModelName, result: &ModelResult) {
        if let Ok(slot) = self.round_bar.lock() {
            if let Some(pb) = slot.as_ref() {
                pb.set_message(Self::outcome_mark(model, result));
                pb.inc(1);
            }
        }
    }

    fn on_round_complete(&self, summary: &RoundSummary) {
        if let Some(pb) = self.round_bar.lock().ok().and_then(|mut slot| slot.take()) {
            pb.finish_with_message(format!(
                "{} ({}/{} succeeded)",
                "done".green(),
                summary.succeeded,
                summary.total
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl PipelineProgressNotifier for SimpleProgress {
    fn on_stage_change(&self, stage: Stage) {
        eprintln!("{} {}", "->".cyan(), stage.display_name().bold());
    }

    fn on_round_start(&self, total_models: usize) {
        eprintln!(
            "{} {} ({} models)",
            "->".cyan(),
            "Fetching model responses".bold(),
            total_models
        );
    }

    fn on_model_complete(&self, model: &ModelName, result: &ModelResult) {
        match result.error_message() {
            Some(message) => eprintln!("  {} {} ({})", "x".red(), model, message),
            None => eprintln!("  {} {}", "v".green(), model),
        }
    }

    fn on_round_complete(&self, _summary: &RoundSummary) {
        eprintln!();
    }
}
