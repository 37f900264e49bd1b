//! Server configuration

use std::time::Duration;

use crate::ai::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Server configuration loaded from environment variables
pub struct Config {
    pub bind_address: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub request_timeout: Duration,
    pub rate_limit_rps: u32,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let gemini_api_key = non_empty_var("GEMINI_API_KEY")
            .or_else(|| non_empty_var("VITE_GEMINI_API_KEY"));

        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            gemini_api_key,
            gemini_base_url: non_empty_var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            gemini_model: non_empty_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS").unwrap_or(60)),
            rate_limit_rps: parse_var("RATE_LIMIT_RPS").filter(|&n| n > 0).unwrap_or(10),
            cors_origins: non_empty_var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|v| v.parse().ok())
}
