use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{ClassifiedError, ErrorCategory};

/// Result of one externally callable operation.
///
/// Serializes to `{"success": true, "data": ..., "rawText": ...}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success { data: T, raw_text: Option<String> },
    Failure(ClassifiedError),
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Outcome::Success {
            data,
            raw_text: None,
        }
    }

    pub fn with_raw_text(data: T, raw_text: impl Into<String>) -> Self {
        Outcome::Success {
            data,
            raw_text: Some(raw_text.into()),
        }
    }

    pub fn failure(category: ErrorCategory, message: impl Into<String>) -> Self {
        Outcome::Failure(ClassifiedError::new(category, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success { data, .. } => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ClassifiedError> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure(err) => Some(err),
        }
    }
}

impl<T> From<ClassifiedError> for Outcome<T> {
    fn from(err: ClassifiedError) -> Self {
        Outcome::Failure(err)
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Success { data, raw_text } => {
                let len = if raw_text.is_some() { 3 } else { 2 };
                let mut state = serializer.serialize_struct("Outcome", len)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                if let Some(raw) = raw_text {
                    state.serialize_field("rawText", raw)?;
                }
                state.end()
            }
            Outcome::Failure(err) => {
                let mut state = serializer.serialize_struct("Outcome", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", &err.message)?;
                state.end()
            }
        }
    }
}
