//! Integration tests for the prescription analysis server.
//!
//! The router is exercised end to end through `tower::ServiceExt::oneshot`.
//! Model calls go either to an in-process stub transport or, for the Gemini
//! client, to a local axum server standing in for the Gemini API.

use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, Uri},
    response::Redirect,
    routing::post,
};
use http_body_util::BodyExt;
use prescription_core::Failure;
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;

use prescription_server::ai::client::API_KEY_HEADER;
use prescription_server::ai::{GeminiClient, ModelTransport};
use prescription_server::config::Config;
use prescription_server::image::EncodedImage;
use prescription_server::orchestrator::Orchestrator;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const REPORT: &str = "1) Patient Name: N/A\n2) Medication Names: Aspirin, Amoxicillin\n3) Dosage Information: 500mg, 250mg\n4) Frequency: Twice daily, Once daily\n5) Duration: 7 days, 5 days\n6) Doctor Name/Signature: N/A\n7) Date: N/A\n8) Warnings/Contraindications: N/A";

const ALTERNATIVES: &str = "```json\n{\"alternatives\": [{\"name\": \"Novamox 250\", \"type\": \"Brand\", \"price\": \"₹60-75 per strip of 10 capsules\", \"manufacturer\": \"Cipla\", \"note\": \"Widely prescribed\"}, {\"name\": \"Amoxicillin 250mg\", \"type\": \"Generic\", \"price\": \"₹25-40 per strip of 10 capsules\", \"manufacturer\": \"Jan Aushadhi\", \"note\": \"Same salt, lower cost\"}]}\n```";

const BOUNDARY: &str = "rx-test-boundary";

const API_KEY: &str = "test-key-7f3a";

/// Transport returning canned text for both operations
struct StubTransport {
    configured: bool,
    report: &'static str,
    alternatives: &'static str,
}

impl ModelTransport for StubTransport {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn analyze_prescription(&self, _image: &EncodedImage) -> Result<String, Failure> {
        Ok(self.report.to_string())
    }

    async fn fetch_alternatives(&self, _medication_name: &str) -> Result<String, Failure> {
        Ok(self.alternatives.to_string())
    }
}

fn stub(report: &'static str, alternatives: &'static str) -> StubTransport {
    StubTransport {
        configured: true,
        report,
        alternatives,
    }
}

fn test_config(rate_limit_rps: u32) -> Config {
    Config {
        bind_address: "0.0.0.0:0".to_string(),
        gemini_api_key: Some(API_KEY.to_string()),
        gemini_base_url: String::new(),
        gemini_model: "gemini-test".to_string(),
        request_timeout: Duration::from_secs(5),
        rate_limit_rps,
        cors_origins: vec!["*".to_string()],
    }
}

/// Build the app router around a stub transport.
fn test_app(transport: StubTransport) -> Router {
    prescription_server::build_app(Orchestrator::new(transport), &test_config(1000))
}

/// Send a request to the app and return (status, body as JSON).
async fn request(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };

    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a POST request with a JSON body.
fn post_json(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Build a multipart upload with one file field.
fn upload(field: &str, media_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"rx.jpg\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {media_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/prescriptions/analyze")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn photo() -> Request<Body> {
    upload(
        prescription_server::IMAGE_FIELD,
        "image/jpeg",
        &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
    )
}

/// Canned answer of the fake Gemini API
#[derive(Clone)]
struct FakeGemini {
    status: StatusCode,
    body: JsonValue,
    delay: Duration,
}

async fn fake_generate(
    State(fake): State<FakeGemini>,
    headers: HeaderMap,
    uri: Uri,
    Json(_request): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    let key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if key != Some(API_KEY) || uri.query().is_some() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": 401, "message": "API key not valid."}})),
        );
    }
    tokio::time::sleep(fake.delay).await;
    (fake.status, Json(fake.body))
}

/// Start a local stand-in for the Gemini API; returns its base URL.
async fn start_fake_gemini(fake: FakeGemini) -> String {
    let app = Router::new()
        .route("/v1beta/models/{call}", post(fake_generate))
        .with_state(fake);
    serve_local(app).await
}

/// Answer every model call with a redirect back to itself
async fn redirect_loop(uri: Uri) -> Redirect {
    Redirect::temporary(&uri.to_string())
}

async fn start_redirecting_gemini() -> String {
    serve_local(Router::new().route("/v1beta/models/{call}", post(redirect_loop))).await
}

async fn serve_local(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake Gemini");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/v1beta")
}

fn gemini_text(text: &str) -> JsonValue {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }]
    })
}

fn gemini_client(base_url: String, timeout: Duration) -> GeminiClient {
    GeminiClient::new(Some(API_KEY.to_string()), base_url, "gemini-test", timeout)
        .expect("Failed to build client")
}

/// Full app wired to the real Gemini client and a fake upstream.
async fn gemini_app(fake: FakeGemini) -> Router {
    let base_url = start_fake_gemini(fake).await;
    let orchestrator = Orchestrator::new(gemini_client(base_url, Duration::from_secs(5)));
    prescription_server::build_app(orchestrator, &test_config(1000))
}

// ---------------------------------------------------------------------------
// Router tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_and_status() {
    let app = test_app(stub(REPORT, ALTERNATIVES));

    let (status, body) = request(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["configured"], true);

    let (status, body) = request(&app, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"configured": true}));
}

#[tokio::test]
async fn test_status_reports_missing_configuration() {
    let app = test_app(StubTransport {
        configured: false,
        report: REPORT,
        alternatives: ALTERNATIVES,
    });

    let (_, body) = request(&app, get("/api/status")).await;
    assert_eq!(body["configured"], false);

    let (status, body) = request(&app, photo()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Gemini API key is not configured. Please check your environment variables."
    );
}

#[tokio::test]
async fn test_analyze_prescription() {
    let app = test_app(stub(REPORT, ALTERNATIVES));

    let (status, body) = request(&app, photo()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["medications"], json!(["Aspirin", "Amoxicillin"]));
    assert_eq!(body["data"]["dosages"], json!(["500mg", "250mg"]));
    assert_eq!(body["data"]["frequencies"], json!(["Twice daily", "Once daily"]));
    assert_eq!(body["data"]["patientName"], "N/A");
    assert_eq!(body["rawText"], REPORT);
}

#[tokio::test]
async fn test_analyze_without_image() {
    let app = test_app(stub(REPORT, ALTERNATIVES));

    // Wrong multipart field name
    let (status, body) = request(&app, upload("file", "image/jpeg", b"abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "No file selected"}));

    // Not multipart at all
    let (status, body) = request(&app, post_json("/api/prescriptions/analyze", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file selected");
}

#[tokio::test]
async fn test_analyze_rejects_oversized_upload() {
    let app = test_app(stub(REPORT, ALTERNATIVES));
    let oversized = vec![0u8; prescription_server::image::MAX_IMAGE_BYTES + 2 * 1024 * 1024];

    let (status, body) = request(&app, upload("image", "image/jpeg", &oversized)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "Image size must be less than 20MB"})
    );
}

#[tokio::test]
async fn test_analyze_rejects_non_images() {
    let app = test_app(stub(REPORT, ALTERNATIVES));

    let (status, body) = request(&app, upload("image", "application/pdf", b"%PDF-1.7")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Please upload a valid image file (JPEG, PNG, WebP, or GIF)"
    );
}

#[tokio::test]
async fn test_analyze_unreadable_prescription() {
    let app = test_app(stub("Sorry, I cannot read this image.", ALTERNATIVES));

    let (status, body) = request(&app, photo()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({"success": false, "error": "Failed to extract valid prescription data"})
    );
}

#[tokio::test]
async fn test_find_alternatives() {
    let app = test_app(stub(REPORT, ALTERNATIVES));

    let (status, body) = request(
        &app,
        post_json("/api/alternatives", json!({"medicationName": "Amoxicillin"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["medicationName"], "Amoxicillin");
    let alternatives = body["data"]["alternatives"].as_array().unwrap();
    assert_eq!(alternatives.len(), 2);
    assert_eq!(alternatives[0]["name"], "Novamox 250");
    assert_eq!(alternatives[0]["type"], "Brand");
    assert_eq!(alternatives[1]["note"], "Same salt, lower cost");
    assert!(body.get("rawText").is_none());
}

#[tokio::test]
async fn test_find_alternatives_requires_name() {
    let app = test_app(stub(REPORT, ALTERNATIVES));

    let (status, body) = request(
        &app,
        post_json("/api/alternatives", json!({"medicationName": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Medication name is required");

    let (_, body) = request(&app, post_json("/api/alternatives", json!({}))).await;
    assert_eq!(body["error"], "Medication name is required");
}

#[tokio::test]
async fn test_find_alternatives_empty_and_malformed() {
    let app = test_app(stub(REPORT, r#"{"alternatives": []}"#));
    let (status, body) = request(
        &app,
        post_json("/api/alternatives", json!({"medicationName": "Amoxicillin"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "No alternatives found for this medication.");

    let app = test_app(stub(REPORT, "Here are some alternatives: Novamox, Mox"));
    let (status, body) = request(
        &app,
        post_json("/api/alternatives", json!({"medicationName": "Amoxicillin"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to parse API response. Please try again.");
}

#[tokio::test]
async fn test_rate_limit() {
    let app = prescription_server::build_app(
        Orchestrator::new(stub(REPORT, ALTERNATIVES)),
        &test_config(1),
    );
    let lookup = || post_json("/api/alternatives", json!({"medicationName": "Amoxicillin"}));

    let (status, _) = request(&app, lookup()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app, lookup()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);

    // Health is not rate limited
    let (status, _) = request(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app(stub(REPORT, ALTERNATIVES));

    let req = Request::builder()
        .uri("/health")
        .header(prescription_server::REQUEST_ID_HEADER, "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(
        response.headers()[prescription_server::REQUEST_ID_HEADER],
        "abc-123"
    );

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert!(
        response
            .headers()
            .contains_key(prescription_server::REQUEST_ID_HEADER)
    );
}

// ---------------------------------------------------------------------------
// Gemini client tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_gemini_analyze_end_to_end() {
    let app = gemini_app(FakeGemini {
        status: StatusCode::OK,
        body: gemini_text(REPORT),
        delay: Duration::ZERO,
    })
    .await;

    let (status, body) = request(&app, photo()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["medications"], json!(["Aspirin", "Amoxicillin"]));
    assert_eq!(body["data"]["dosages"], json!(["500mg", "250mg"]));
}

#[tokio::test]
async fn test_gemini_invalid_key_end_to_end() {
    let app = gemini_app(FakeGemini {
        status: StatusCode::UNAUTHORIZED,
        body: json!({"error": {"code": 401, "message": "API key not valid.", "status": "UNAUTHENTICATED"}}),
        delay: Duration::ZERO,
    })
    .await;

    let (_, body) = request(&app, photo()).await;

    assert_eq!(
        body,
        json!({"success": false, "error": "Invalid API key. Please check and try again."})
    );
}

#[tokio::test]
async fn test_gemini_alternatives_end_to_end() {
    let app = gemini_app(FakeGemini {
        status: StatusCode::OK,
        body: gemini_text(ALTERNATIVES),
        delay: Duration::ZERO,
    })
    .await;

    let (status, body) = request(
        &app,
        post_json("/api/alternatives", json!({"medicationName": "Amoxicillin"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["alternatives"][1]["type"], "Generic");
}

#[tokio::test]
async fn test_gemini_status_errors() {
    let base_url = start_fake_gemini(FakeGemini {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: json!({"error": {"code": 503, "message": "The model is overloaded."}}),
        delay: Duration::ZERO,
    })
    .await;
    let client = gemini_client(base_url, Duration::from_secs(5));

    match client.fetch_alternatives("Amoxicillin").await {
        Err(Failure::Status {
            status,
            upstream_message,
        }) => {
            assert_eq!(status, 503);
            assert_eq!(upstream_message.as_deref(), Some("The model is overloaded."));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let base_url = start_fake_gemini(FakeGemini {
        status: StatusCode::TOO_MANY_REQUESTS,
        body: json!({"unexpected": true}),
        delay: Duration::ZERO,
    })
    .await;
    let client = gemini_client(base_url, Duration::from_secs(5));

    match client.fetch_alternatives("Amoxicillin").await {
        Err(Failure::Status {
            status,
            upstream_message,
        }) => {
            assert_eq!(status, 429);
            assert!(upstream_message.is_none());
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_missing_text_is_empty_payload() {
    let base_url = start_fake_gemini(FakeGemini {
        status: StatusCode::OK,
        body: json!({"candidates": [{"finishReason": "SAFETY"}]}),
        delay: Duration::ZERO,
    })
    .await;
    let client = gemini_client(base_url, Duration::from_secs(5));

    let result = client.fetch_alternatives("Amoxicillin").await;
    assert!(matches!(result, Err(Failure::EmptyPayload)));
}

#[tokio::test]
async fn test_gemini_timeout() {
    let base_url = start_fake_gemini(FakeGemini {
        status: StatusCode::OK,
        body: gemini_text(REPORT),
        delay: Duration::from_secs(3),
    })
    .await;
    let client = gemini_client(base_url, Duration::from_millis(200));

    let result = client.fetch_alternatives("Amoxicillin").await;
    assert!(matches!(result, Err(Failure::Timeout)));
}

#[tokio::test]
async fn test_gemini_connection_refused() {
    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = gemini_client(format!("http://{addr}/v1beta"), Duration::from_secs(5));

    let result = client.fetch_alternatives("Amoxicillin").await;
    assert!(matches!(result, Err(Failure::Connection(_))));
}

#[tokio::test]
async fn test_gemini_transport_errors_never_expose_the_key() {
    let base_url = start_redirecting_gemini().await;
    let client = gemini_client(base_url.clone(), Duration::from_secs(5));

    let failure = client
        .fetch_alternatives("Amoxicillin")
        .await
        .expect_err("redirect loop should fail");
    assert!(!failure.to_string().contains(API_KEY), "{failure}");

    let orchestrator = Orchestrator::new(gemini_client(base_url, Duration::from_secs(5)));
    let app = prescription_server::build_app(orchestrator, &test_config(1000));
    let (status, body) = request(
        &app,
        post_json("/api/alternatives", json!({"medicationName": "Amoxicillin"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains(API_KEY), "{message}");
    assert!(!message.contains("generateContent"), "{message}");
}

#[tokio::test]
async fn test_gemini_unconfigured_client_does_not_connect() {
    let client = GeminiClient::new(
        None,
        "http://127.0.0.1:9/v1beta",
        "gemini-test",
        Duration::from_secs(5),
    )
    .unwrap();

    assert!(!client.is_configured());
    let result = client.fetch_alternatives("Amoxicillin").await;
    assert!(matches!(result, Err(Failure::MissingCredential)));
}
