//! Application error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Unknown storage backend: {0}")]
    UnknownStorageBackend(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
