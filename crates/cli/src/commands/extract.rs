use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use proposer_core::FieldExtractor;

use crate::commands::{CommandResult, EXIT_INPUT};

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct TranscriptInput {
    #[arg(long, help = "Transcript text passed inline")]
    pub text: Option<String>,
    #[arg(long, help = "Path to a UTF-8 transcript file")]
    pub file: Option<PathBuf>,
}

impl TranscriptInput {
    pub fn read(&self) -> anyhow::Result<String> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("failed to read transcript `{}`", path.display())),
            (None, None) => anyhow::bail!("either --text or --file is required"),
        }
    }
}

pub fn run(input: &TranscriptInput) -> CommandResult {
    let text = match input.read() {
        Ok(text) => text,
        Err(error) => {
            return CommandResult::failure("extract", "input", format!("{error:#}"), EXIT_INPUT)
        }
    };

    let extraction = FieldExtractor::shared().extract(&text);
    let message = if extraction.notices.is_empty() {
        "extracted all client facts".to_string()
    } else {
        format!(
            "extracted client facts; {} field(s) fell back to defaults",
            extraction.notices.len()
        )
    };

    CommandResult::success_with_data("extract", message, &extraction)
}
