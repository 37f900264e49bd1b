//! Generative-model transport

pub mod client;
pub mod prompts;

pub use client::GeminiClient;

use prescription_core::Failure;
use std::future::Future;

use crate::image::EncodedImage;

/// The external model as the orchestrator sees it: one call per operation,
/// returning the model's raw text or a transport failure.
pub trait ModelTransport: Send + Sync {
    /// Whether a credential is present
    fn is_configured(&self) -> bool;

    /// Ask for the numbered transcription of a prescription image
    fn analyze_prescription(
        &self,
        image: &EncodedImage,
    ) -> impl Future<Output = Result<String, Failure>> + Send;

    /// Ask for market alternatives of a medication, as JSON text
    fn fetch_alternatives(
        &self,
        medication_name: &str,
    ) -> impl Future<Output = Result<String, Failure>> + Send;
}
