//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("persist error: {0}")]
    Persist(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
