//! Line-editor prompts for the interactive stages

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use forge_domain::{ClarifyingQuestions, ModelName};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use std::io;

/// Reads the base request, answers and model choices from the terminal
///
/// Every method returns `Ok(None)` when the user cancels with Ctrl-C or
/// Ctrl-D.
pub struct InteractivePrompter {
    editor: Reedline,
}

impl InteractivePrompter {
    pub fn new() -> Self {
        Self {
            editor: Reedline::create(),
        }
    }

    fn read(&mut self, label: &str) -> io::Result<Option<String>> {
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(label.to_string()),
            DefaultPromptSegment::Empty,
        );
        match self.editor.read_line(&prompt)? {
            Signal::Success(line) => Ok(Some(line)),
            _ => Ok(None),
        }
    }

    /// Ask for the base request until a non-blank one is entered
    pub fn read_base_request(&mut self) -> io::Result<Option<String>> {
        println!("{}", "What do you want the models to do?".bold());
        loop {
            match self.read("request")? {
                Some(line) if line.trim().is_empty() => continue,
                other => return Ok(other),
            }
        }
    }

    /// Ask every question in order; blank answers are allowed
    pub fn ask_answers(&mut self, questions: &ClarifyingQuestions) -> io::Result<Option<Vec<String>>> {
        println!("{}", ConsoleFormatter::format_questions(questions));
        let mut answers = Vec::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            println!("{} {}", format!("{}.", index + 1).cyan(), question);
            match self.read("answer")? {
                Some(answer) => answers.push(answer.trim().to_string()),
                None => return Ok(None),
            }
        }
        Ok(Some(answers))
    }

    /// Ask which models to query, re-prompting on invalid input
    pub fn choose_models(
        &mut self,
        catalogue: &[ModelName],
        recommended: &[ModelName],
    ) -> io::Result<Option<Vec<ModelName>>> {
        println!("{}", ConsoleFormatter::format_catalogue(catalogue, recommended));
        let hint = if recommended.is_empty() {
            "Numbers or names, comma separated"
        } else {
            "Numbers or names, comma separated (empty = recommended)"
        };
        println!("{}", hint.dimmed());

        loop {
            let Some(line) = self.read("models")? else {
                return Ok(None);
            };
            if line.trim().is_empty() && !recommended.is_empty() {
                return Ok(Some(recommended.to_vec()));
            }
            match parse_model_choice(&line, catalogue) {
                Ok(models) => return Ok(Some(models)),
                Err(message) => println!("{} {}", "!".yellow(), message),
            }
        }
    }

    /// Yes/no question; anything but an explicit "n" counts as yes
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        println!("{} {}", question, "[Y/n]".dimmed());
        Ok(self
            .read("")?
            .map(|answer| !answer.trim().eq_ignore_ascii_case("n"))
            .unwrap_or(false))
    }
}

impl Default for InteractivePrompter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a comma-separated model choice.
///
/// Tokens are 1-based catalogue positions or model names; names outside
/// the catalogue are accepted as typed.
pub fn parse_model_choice(input: &str, catalogue: &[ModelName]) -> Result<Vec<ModelName>, String> {
    let mut models = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let model = match token.parse::<usize>() {
            Ok(position) => position
                .checked_sub(1)
                .and_then(|index| catalogue.get(index))
                .cloned()
                .ok_or_else(|| format!("No model numbered {}", position))?,
            Err(_) => ModelName::new(token).map_err(|e| e.to_string())?,
        };
        models.push(model);
    }
    if models.is_empty() {
        return Err("Select at least one model".to_string());
    }
    Ok(models)
}
