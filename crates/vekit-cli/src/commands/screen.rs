use anyhow::Result;
use std::process::ExitCode;
use vekit_config::Config;
use vekit_security::{ContentFilter, Guardrail};

use super::redact::redactor_for;
use super::text_or_stdin;

pub fn handle(config: &Config, text: Option<String>) -> Result<ExitCode> {
    let text = text_or_stdin(text)?;
    let filter = ContentFilter::new(
        Guardrail::new(&config.guardrail.blocked_words),
        redactor_for(config)?,
    );

    match filter.screen_input(&text) {
        Ok(()) => {
            println!("allowed");
            Ok(ExitCode::SUCCESS)
        }
        Err(refusal) => {
            println!("{}", refusal);
            Ok(ExitCode::FAILURE)
        }
    }
}
