mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use vekit_config::{Config, RuntimeEnv};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: cli::Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    // Environment is read once here and passed down
    let env = RuntimeEnv::from_env();

    match cli.command {
        cli::Commands::Upload {
            path,
            bucket,
            region,
            expires,
        } => commands::upload::handle(&config, env, &path, bucket, region, expires).await,
        cli::Commands::Download {
            urls,
            save_dir,
            filenames,
        } => commands::download::handle(&config, &urls, save_dir, filenames).await,
        cli::Commands::Redact { text, report } => commands::redact::handle(&config, text, report),
        cli::Commands::Screen { text } => commands::screen::handle(&config, text),
        cli::Commands::Skill(skill_cmd) => commands::skill::handle(skill_cmd, &config, env).await,
        cli::Commands::Publish { file, kind, bucket } => {
            commands::publish::handle(&config, env, &file, &kind, bucket).await
        }
    }
}
