//! prescription-core: interpretation of generative-model output
//!
//! Turns the loosely structured text a vision model returns for a
//! prescription photo, and the near-JSON it returns for alternative
//! medicines, into validated records. Also classifies every failure along
//! the way into a fixed set of user-facing errors. Pure functions only; no
//! I/O happens in this crate.

pub mod alternatives;
pub mod classify;
pub mod error;
pub mod line_record;
pub mod outcome;
pub mod prescription;

pub use alternatives::{AlternativeRecord, AlternativesRecord, strip_code_fences};
pub use classify::{Failure, classify};
pub use error::{ClassifiedError, ErrorCategory, InterpretError};
pub use line_record::LineRecord;
pub use outcome::Outcome;
pub use prescription::{MedicationLine, NOT_AVAILABLE, PrescriptionBuilder, PrescriptionRecord};
