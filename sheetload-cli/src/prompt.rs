//! Interactive confirmation gates

use anyhow::{Context, Result};
use dialoguer::Input;

/// Source of answers for the two confirmation gates
pub trait Prompt {
    /// Ask for a typed phrase; the raw answer is returned for literal comparison
    fn confirm_phrase(&self, message: &str) -> Result<String>;

    /// Ask a yes/no question; only `yes` (any case) proceeds
    fn confirm_continue(&self, message: &str) -> Result<bool>;
}

/// Terminal prompt, optionally pre-answered from command-line flags
#[derive(Debug, Clone, Default)]
pub struct CliPrompt {
    /// `--yes`: skip the continue gate
    pub assume_yes: bool,
    /// `--confirm <PHRASE>`: answer for the destructive gate
    pub phrase: Option<String>,
}

impl CliPrompt {
    pub fn new(assume_yes: bool, phrase: Option<String>) -> Self {
        Self { assume_yes, phrase }
    }
}

impl Prompt for CliPrompt {
    fn confirm_phrase(&self, message: &str) -> Result<String> {
        if let Some(phrase) = &self.phrase {
            return Ok(phrase.clone());
        }
        Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .context("Failed to read confirmation")
    }

    fn confirm_continue(&self, message: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let answer = Input::<String>::new()
            .with_prompt(format!("{} (yes/no)", message))
            .allow_empty(true)
            .interact_text()
            .context("Failed to read confirmation")?;
        Ok(is_yes(&answer))
    }
}

pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}
