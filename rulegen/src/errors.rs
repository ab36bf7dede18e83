use crate::{config::ConfigError, drift::DriftError};
use std::{io, path::PathBuf};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to load configuration")]
    Config(#[from] ConfigError),

    #[error("failed to generate rules from schema")]
    Schema(#[from] schema::Error),

    #[error("failed to read {}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Drift(#[from] DriftError),

    #[error("tracing parse error")]
    TracingParse(#[from] tracing_subscriber::filter::ParseError),

    #[error("error setting tracing global subscriber")]
    TracingSetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}
