//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after config is resolved. Output goes to
//! stderr so it never interleaves with console replies on stdout.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Initialise the global tracing subscriber.
///
/// `level` accepts a level string (`"warn"`, `"debug"`, ...) or a full
/// filter directive (`"topicmap=debug,reqwest=warn"`). When `level` does not
/// parse, `RUST_LOG` is used as the fallback.
pub fn init(level: &str) -> Result<(), AppError> {
    let filter = match EnvFilter::try_new(level) {
        Ok(filter) => filter,
        Err(level_err) => EnvFilter::try_from_default_env().map_err(|env_err| {
            AppError::Logger(format!(
                "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
            ))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Parse a plain level string into a [`LevelFilter`]. Used to validate the
/// configured level before the subscriber is installed.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}
