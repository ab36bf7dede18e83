#![warn(clippy::unwrap_used, clippy::expect_used)]

mod config;
mod drift;
mod errors;
mod pipeline;
mod util;

use crate::config::{Config, LogFormat, LogLevel, RulegenCommand};
use crate::errors::{AppError, Result};
use std::{error::Error, process::ExitCode};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::new()?;
    setup_tracing(config.log_level, config.log_format)?;

    match config.command {
        RulegenCommand::Generate => pipeline::generate(&config),
        RulegenCommand::Check => pipeline::check(&config),
        RulegenCommand::PrintDirective => {
            println!("{}", schema::FIRESTORE_DIRECTIVE_SDL);
            Ok(())
        }
    }
}

/// Logs go to stderr, stdout is left for command output
fn setup_tracing(log_level: LogLevel, log_format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.as_directive()))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Json => tracing::subscriber::set_global_default(subscriber.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(subscriber.finish())?,
    }

    Ok(())
}

fn report(err: &AppError) {
    eprintln!("error: {err}");

    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("Caused by: {cause}");
        source = cause.source();
    }
}
