use serde::Serialize;
use thiserror::Error;

/// Top-level application errors: configuration loading and engine wiring.
///
/// Remote-call failures never surface here; they are handled inside the
/// TVDB pipeline (`TvdbError`) and the discovery engine.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::FileSystem(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Config(format!("Serialization error: {}", e))
    }
}
