//! Error taxonomy for the generation pipeline
//!
//! Every external-call site is boundary-wrapped into one of these variants;
//! per-stage policy (fatal, isolated, fallback) is decided by the stage that
//! observes the error, not here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// A required credential or setting is missing. Fatal, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request failed schema constraints before any provider call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A network/HTTP failure talking to an external provider.
    #[error("provider call failed: {0}")]
    ProviderCall(String),

    /// The provider responded but no usable structured payload was found.
    #[error("provider response unusable: {0}")]
    ProviderParse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::ProviderCall(err.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::ProviderParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
