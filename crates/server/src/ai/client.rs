//! Gemini API client for the `generateContent` endpoint

use prescription_core::Failure;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::ModelTransport;
use super::prompts;
use crate::image::EncodedImage;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Header carrying the API key; keeps the credential out of request URLs
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` API
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

/// Request body for `generateContent`
#[derive(Serialize)]
struct ApiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<Part<'a>>,
}

/// A prompt part: either text or an inline base64 image
#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

/// Response from `generateContent`; only the fields we read
#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl ApiResponse {
    /// Text of the first part of the first candidate
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

/// Error detail from the API
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GeminiClient {
    /// Create a client. A `None` key leaves the client unconfigured; every
    /// call then fails with [`Failure::MissingCredential`].
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn api_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send one prompt and return the model's text answer.
    ///
    /// Records `gemini_requests_total` (by outcome) and
    /// `gemini_request_duration_seconds` for every call that reaches the API.
    async fn generate(&self, parts: Vec<Part<'_>>) -> Result<String, Failure> {
        let api_key = self.api_key.as_deref().ok_or(Failure::MissingCredential)?;

        let start = Instant::now();
        let result = self.send(api_key, parts).await;
        let duration = start.elapsed().as_secs_f64();

        metrics::counter!(
            "gemini_requests_total",
            "model" => self.model.clone(),
            "outcome" => outcome_label(&result)
        )
        .increment(1);
        metrics::histogram!("gemini_request_duration_seconds", "model" => self.model.clone())
            .record(duration);

        result
    }

    async fn send(&self, api_key: &str, parts: Vec<Part<'_>>) -> Result<String, Failure> {

        let request = ApiRequest {
            contents: vec![RequestContent { parts }],
        };

        let response = self
            .http
            .post(self.api_url())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let upstream_message = serde_json::from_str::<ApiError>(&body)
                .ok()
                .map(|e| e.error.message);
            tracing::warn!(
                status = status.as_u16(),
                body = %body,
                "Gemini API returned an error status"
            );
            return Err(Failure::Status {
                status: status.as_u16(),
                upstream_message,
            });
        }

        let body = response.text().await.map_err(transport_failure)?;
        let parsed: ApiResponse = serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Gemini response body is not the expected JSON");
            ApiResponse::default()
        });

        parsed.first_text().ok_or(Failure::EmptyPayload)
    }
}

/// Map a reqwest error onto the transport failures the classifier knows.
///
/// The URL is dropped before the error is rendered.
fn transport_failure(err: reqwest::Error) -> Failure {
    let err = err.without_url();
    if err.is_timeout() {
        Failure::Timeout
    } else if err.is_connect() {
        Failure::Connection(err.to_string())
    } else {
        Failure::Other(err.to_string())
    }
}

fn outcome_label(result: &Result<String, Failure>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(Failure::Timeout) => "timeout",
        Err(Failure::Connection(_)) => "connection_error",
        Err(Failure::Status { .. }) => "status_error",
        Err(Failure::EmptyPayload) => "empty",
        Err(_) => "error",
    }
}

impl ModelTransport for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn analyze_prescription(&self, image: &EncodedImage) -> Result<String, Failure> {
        self.generate(vec![
            Part::Text {
                text: prompts::PRESCRIPTION_PROMPT,
            },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: &image.media_type,
                    data: &image.data,
                },
            },
        ])
        .await
    }

    async fn fetch_alternatives(&self, medication_name: &str) -> Result<String, Failure> {
        let prompt = prompts::alternatives_prompt(medication_name);
        self.generate(vec![Part::Text { text: &prompt }]).await
    }
}
