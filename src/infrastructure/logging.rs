use crate::domain::{AppError, AppResult};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber, appending to `log_file`.
///
/// The terminal belongs to the UI, so without a log file nothing is
/// installed and events are discarded.
pub fn init_logger(verbose: bool, log_file: Option<&Path>) -> AppResult<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let default_directive = if verbose { "bizscope=debug" } else { "bizscope=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| AppError::Logging { message: e.to_string() })
}
