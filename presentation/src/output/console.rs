//! Console output formatter for pipeline runs and history

use colored::Colorize;
use forge_domain::{
    ClarifyingQuestions, ModelName, ModelResult, PromptDetail, PromptSummary, RoundSummary,
    RunState, Stage, preview,
};
use serde::Serialize;

const WIDTH: usize = 60;

/// Formats run state and history records for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete run: request, answers, results
    pub fn format(state: &RunState) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Prompt Forge Results"));
        output.push('\n');

        if let Some(request) = state.request() {
            output.push_str(&format!(
                "{} {}\n",
                "Request:".cyan().bold(),
                request.base_text()
            ));
            if let Some(id) = request.id() {
                output.push_str(&format!("{} {}\n", "Prompt ID:".cyan().bold(), id));
            }
        }
        output.push_str(&format!(
            "{} {}\n",
            "Stage:".cyan().bold(),
            Self::stage_line(state.stage())
        ));

        if !state.answers().is_empty() {
            output.push_str(&Self::section_header("Questionnaire"));
            for answer in state.answers() {
                let text = if answer.is_blank() {
                    "(no answer)".dimmed().to_string()
                } else {
                    answer.answer.clone()
                };
                output.push_str(&format!("  {} {}\n    {}\n", "Q:".bold(), answer.question, text));
            }
        }

        if !state.recommendations().is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Recommended:".green().bold(),
                Self::join_models(state.recommendations())
            ));
        }

        if !state.results().is_empty() {
            output.push_str(&Self::section_header("Model Responses"));
            for (model, result) in state.results().iter() {
                output.push_str(&Self::format_result(model, result));
            }
        }

        if let Some(prompt) = state.optimized_prompt_for_display() {
            output.push_str(&Self::section_header("Optimized Prompt"));
            output.push_str(&format!("\n{}\n", Self::indent(prompt, "  ")));
        }

        if let Some(error) = state.page_error() {
            output.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error));
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format one model's result block
    pub fn format_result(model: &ModelName, result: &ModelResult) -> String {
        match result {
            ModelResult::Success { output, .. } => format!(
                "\n{}\n{}\n",
                format!("── {} ──", model).yellow().bold(),
                output
            ),
            ModelResult::Error { message } => format!(
                "\n{}\nError: {}\n",
                format!("── {} ──", model).red().bold(),
                message
            ),
            ModelResult::Pending | ModelResult::Loading => format!(
                "\n{}\n{}\n",
                format!("── {} ──", model).dimmed(),
                result.status()
            ),
        }
    }

    /// Format the clarifying questions as a numbered list
    pub fn format_questions(questions: &ClarifyingQuestions) -> String {
        let mut output = Self::section_header("Clarifying Questions");
        if questions.is_empty() {
            output.push_str("  (no questions; submit to continue)\n");
        }
        for (index, question) in questions.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", index + 1, question));
        }
        output
    }

    /// Format the selectable catalogue, marking recommended models
    pub fn format_catalogue(catalogue: &[ModelName], recommended: &[ModelName]) -> String {
        let mut output = Self::section_header("Available Models");
        for (index, model) in catalogue.iter().enumerate() {
            let mark = if recommended.contains(model) {
                format!(" {}", "(recommended)".green())
            } else {
                String::new()
            };
            output.push_str(&format!("  {}. {}{}\n", index + 1, model, mark));
        }
        let extra: Vec<&ModelName> = recommended
            .iter()
            .filter(|m| !catalogue.contains(m))
            .collect();
        if !extra.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                "Also recommended:".green(),
                extra
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        output
    }

    /// One-line summary of a finished round
    pub fn format_round_summary(summary: &RoundSummary) -> String {
        let counts = format!(
            "{}/{} models succeeded",
            summary.succeeded, summary.total
        );
        if summary.all_failed() {
            format!("{} {}", "Round failed:".red().bold(), counts)
        } else {
            format!("{} {}", "Round complete:".green().bold(), counts)
        }
    }

    /// Format the history listing
    pub fn format_history(prompts: &[PromptSummary]) -> String {
        let mut output = Self::header("Prompt History");
        output.push('\n');
        if prompts.is_empty() {
            output.push_str("No prompts submitted yet.\n");
        }
        for prompt in prompts {
            output.push_str(&format!(
                "{:>6}  {}  {}\n",
                prompt.id.to_string().cyan(),
                prompt.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                preview(&prompt.base_prompt, 60)
            ));
        }
        output
    }

    /// Format one stored request with its outputs, newest first
    pub fn format_history_detail(detail: &PromptDetail) -> String {
        let mut output = Self::header(&format!("Prompt {}", detail.id));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n{} {}\n",
            "Request:".cyan().bold(),
            detail.base_prompt,
            "Submitted:".cyan().bold(),
            detail.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));

        if !detail.questionnaire_responses.is_empty() {
            output.push_str(&Self::section_header("Questionnaire"));
            for answer in &detail.questionnaire_responses {
                output.push_str(&format!(
                    "  {} {}\n    {}\n",
                    "Q:".bold(),
                    answer.question,
                    answer.answer
                ));
            }
        }

        output.push_str(&Self::section_header("Model Outputs"));
        let outputs = detail.outputs_newest_first();
        if outputs.is_empty() {
            output.push_str("  (no model outputs stored)\n");
        }
        for record in outputs {
            output.push_str(&format!(
                "\n{} {}\n{}\n",
                format!("── {} ──", record.model_name).yellow().bold(),
                record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                record.output
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    fn stage_line(stage: Stage) -> String {
        format!("{}/3 {}", stage.step(), stage.display_name())
    }

    fn join_models(models: &[ModelName]) -> String {
        models
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(WIDTH);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(WIDTH).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
