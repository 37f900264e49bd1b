//! Request orchestration for the two user-facing operations
//!
//! Each operation is one linear pipeline: local preconditions, configuration
//! check, a single transport call, interpretation. Every failure is caught
//! here, logged with its diagnostic detail and returned as an [`Outcome`]
//! carrying only the user-facing message.

use prescription_core::{
    AlternativesRecord, ErrorCategory, Failure, Outcome, PrescriptionRecord, classify,
};

use crate::ai::ModelTransport;
use crate::image::{ImageError, ImageUpload};

pub const NO_PRESCRIPTION_DATA: &str = "Failed to extract valid prescription data";
pub const MEDICATION_REQUIRED: &str = "Medication name is required";
pub const NO_ALTERNATIVES: &str = "No alternatives found for this medication.";

/// Sequences preconditions, transport and interpretation.
///
/// Holds no mutable state, so one instance can serve concurrent requests.
pub struct Orchestrator<T> {
    transport: T,
}

impl<T: ModelTransport> Orchestrator<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// True iff the model credential is present
    pub fn is_configured(&self) -> bool {
        self.transport.is_configured()
    }

    /// Transcribe a prescription image into a [`PrescriptionRecord`].
    ///
    /// Succeeds with the record and the model's raw text.
    pub async fn analyze(&self, upload: Option<&ImageUpload>) -> Outcome<PrescriptionRecord> {
        let upload = match upload {
            Some(upload) => upload,
            None => return rejected(ImageError::Missing),
        };
        if let Err(err) = upload.validate() {
            return rejected(err);
        }

        let text = match self.request_analysis(upload).await {
            Ok(text) => text,
            Err(failure) => return failed("analyze", failure),
        };

        match PrescriptionRecord::from_report(&text).filter(PrescriptionRecord::is_valid) {
            Some(record) => {
                tracing::info!(
                    medications = record.medication_count(),
                    "Prescription analyzed"
                );
                Outcome::with_raw_text(record, text)
            }
            None => {
                tracing::warn!(raw_text = %text, "No usable prescription fields in model output");
                Outcome::failure(ErrorCategory::EmptyResult, NO_PRESCRIPTION_DATA)
            }
        }
    }

    /// Look up market alternatives for one medication.
    pub async fn find_alternatives(&self, medication_name: &str) -> Outcome<AlternativesRecord> {
        let medication_name = medication_name.trim();
        if medication_name.is_empty() {
            return Outcome::failure(ErrorCategory::InvalidRequest, MEDICATION_REQUIRED);
        }

        match self.request_alternatives(medication_name).await {
            Ok(record) if record.has_alternatives() => {
                tracing::info!(
                    medication = %medication_name,
                    count = record.count(),
                    "Alternatives found"
                );
                Outcome::success(record)
            }
            Ok(_) => {
                tracing::info!(medication = %medication_name, "Model returned no alternatives");
                Outcome::failure(ErrorCategory::EmptyResult, NO_ALTERNATIVES)
            }
            Err(failure) => failed("find_alternatives", failure),
        }
    }

    async fn request_analysis(&self, upload: &ImageUpload) -> Result<String, Failure> {
        if !self.transport.is_configured() {
            return Err(Failure::MissingCredential);
        }
        let image = upload
            .encode()
            .map_err(|e| Failure::Other(e.to_string()))?;
        self.transport.analyze_prescription(&image).await
    }

    async fn request_alternatives(
        &self,
        medication_name: &str,
    ) -> Result<AlternativesRecord, Failure> {
        if !self.transport.is_configured() {
            return Err(Failure::MissingCredential);
        }
        let text = self.transport.fetch_alternatives(medication_name).await?;
        Ok(AlternativesRecord::from_model_output(&text, medication_name)?)
    }
}

/// Local precondition failure; never reaches the classifier
fn rejected<D>(err: ImageError) -> Outcome<D> {
    tracing::debug!(error = %err, "Image rejected");
    Outcome::failure(ErrorCategory::InvalidRequest, err.to_string())
}

fn failed<D>(operation: &str, failure: Failure) -> Outcome<D> {
    let classified = classify(&failure);
    match &failure {
        Failure::Interpret(err) => tracing::error!(
            operation,
            error = %err,
            raw_text = %err.raw(),
            "Could not interpret model output"
        ),
        _ => tracing::error!(
            operation,
            error = %failure,
            category = ?classified.category,
            "Operation failed"
        ),
    }
    Outcome::Failure(classified)
}
