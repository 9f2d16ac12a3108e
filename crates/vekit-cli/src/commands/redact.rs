use anyhow::Result;
use std::process::ExitCode;
use vekit_config::Config;
use vekit_security::Redactor;

use super::text_or_stdin;

/// Configured rules replace the built-in PII set entirely
pub fn redactor_for(config: &Config) -> Result<Redactor> {
    if config.redaction.rules.is_empty() {
        Ok(Redactor::pii())
    } else {
        Ok(Redactor::from_patterns(config.redaction_patterns())?)
    }
}

pub fn handle(config: &Config, text: Option<String>, report: bool) -> Result<ExitCode> {
    let from_stdin = text.is_none();
    let text = text_or_stdin(text)?;
    let redactor = redactor_for(config)?;

    let (redacted, infos) = redactor.redact_with_report(&text);

    if report {
        for info in &infos {
            eprintln!("  {}: {}", info.rule, info.count);
        }
    }

    if from_stdin {
        print!("{}", redacted);
    } else {
        println!("{}", redacted);
    }

    Ok(ExitCode::SUCCESS)
}
