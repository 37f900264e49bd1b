//! Failure classification
//!
//! Every failure an operation can hit is described by [`Failure`] and reduced
//! by [`classify`] to exactly one [`ClassifiedError`]. Messages are fixed per
//! category; upstream text only surfaces for statuses with no fixed message.

use crate::error::{ClassifiedError, ErrorCategory, InterpretError};

pub const MISSING_API_KEY: &str =
    "Gemini API key is not configured. Please check your environment variables.";
pub const TIMED_OUT: &str = "Request timed out. Please try again.";
pub const CONNECTION_FAILED: &str = "Connection failed. Please check your internet connection.";
pub const INVALID_REQUEST: &str = "Invalid API request. Check your API key and image.";
pub const INVALID_API_KEY: &str = "Invalid API key. Please check and try again.";
pub const ACCESS_DENIED: &str = "API access denied. Check your API key permissions.";
pub const RATE_LIMITED: &str = "Too many requests. Please wait a moment and try again.";
pub const SERVER_ERROR: &str = "Gemini API server error. Please try again later.";
pub const INVALID_RESPONSE: &str = "Invalid response from Gemini API";
pub const UNPARSEABLE_RESPONSE: &str = "Failed to parse API response. Please try again.";

/// Anything that can go wrong between a request and a record
#[derive(Debug)]
pub enum Failure {
    /// No credential configured; detected before any transport attempt
    MissingCredential,
    /// Request aborted by the transport's timeout
    Timeout,
    /// Endpoint could not be reached
    Connection(String),
    /// Endpoint answered with a non-success status
    Status {
        status: u16,
        upstream_message: Option<String>,
    },
    /// Success status but no text payload
    EmptyPayload,
    /// Payload text could not be interpreted
    Interpret(InterpretError),
    /// Anything else, message kept verbatim
    Other(String),
}

impl From<InterpretError> for Failure {
    fn from(err: InterpretError) -> Self {
        Failure::Interpret(err)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::MissingCredential => write!(f, "API credential not configured"),
            Failure::Timeout => write!(f, "request timed out"),
            Failure::Connection(e) => write!(f, "connection failed: {e}"),
            Failure::Status {
                status,
                upstream_message,
            } => match upstream_message {
                Some(msg) => write!(f, "upstream status {status}: {msg}"),
                None => write!(f, "upstream status {status}"),
            },
            Failure::EmptyPayload => write!(f, "response carried no text payload"),
            Failure::Interpret(e) => write!(f, "{e}"),
            Failure::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// Map a failure to its category and user-facing message
pub fn classify(failure: &Failure) -> ClassifiedError {
    use ErrorCategory::*;

    match failure {
        Failure::MissingCredential => ClassifiedError::new(InvalidApiKey, MISSING_API_KEY),
        Failure::Timeout => ClassifiedError::new(Timeout, TIMED_OUT),
        Failure::Connection(_) => ClassifiedError::new(ConnectionFailure, CONNECTION_FAILED),
        Failure::Status {
            status,
            upstream_message,
        } => classify_status(*status, upstream_message.as_deref()),
        Failure::EmptyPayload => ClassifiedError::new(MalformedResponse, INVALID_RESPONSE),
        Failure::Interpret(_) => ClassifiedError::new(MalformedResponse, UNPARSEABLE_RESPONSE),
        Failure::Other(msg) => ClassifiedError::new(Unclassified, msg.clone()),
    }
}

fn classify_status(status: u16, upstream_message: Option<&str>) -> ClassifiedError {
    use ErrorCategory::*;

    match status {
        400 => ClassifiedError::new(InvalidRequest, INVALID_REQUEST),
        401 => ClassifiedError::new(InvalidApiKey, INVALID_API_KEY),
        403 => ClassifiedError::new(AccessDenied, ACCESS_DENIED),
        429 => ClassifiedError::new(RateLimited, RATE_LIMITED),
        500 => ClassifiedError::new(ServerError, SERVER_ERROR),
        _ => match upstream_message.filter(|m| !m.is_empty()) {
            Some(msg) => ClassifiedError::new(Unclassified, msg),
            None => ClassifiedError::new(Unclassified, format!("API error: {status}")),
        },
    }
}
