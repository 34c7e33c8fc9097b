//! Crate-level error type
//!
//! Only setup can fail. Problems during expansion are rendered into the
//! output as diagnostic tokens instead of being returned.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Input or output failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP client could not be constructed
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Output could not be serialized
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
