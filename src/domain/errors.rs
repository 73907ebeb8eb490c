use thiserror::Error;

/// Failures of the collaborators around the interaction core: loading
/// businesses, reading configuration, installing the logger.
///
/// The interaction store and both views are total and never produce these.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid business data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Logger initialisation failed: {message}")]
    Logging { message: String },
}

pub type AppResult<T> = Result<T, AppError>;
