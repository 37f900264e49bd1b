use serde::Serialize;
use thiserror::Error;

/// Model output that could not be turned into a record
#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("could not parse model output as JSON: {source}")]
    InvalidJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model output has an unexpected shape: {reason}")]
    UnexpectedShape { raw: String, reason: String },
}

impl InterpretError {
    /// Sanitized model text, for diagnostics only
    pub fn raw(&self) -> &str {
        match self {
            InterpretError::InvalidJson { raw, .. } | InterpretError::UnexpectedShape { raw, .. } => {
                raw
            }
        }
    }
}

/// User-facing error categories
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    Timeout,
    ConnectionFailure,
    InvalidRequest,
    InvalidApiKey,
    AccessDenied,
    RateLimited,
    ServerError,
    MalformedResponse,
    EmptyResult,
    Unclassified,
}

/// A failure reduced to its category and the one message users may see
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}
