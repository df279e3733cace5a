use std::env;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REQUEST_TIMEOUT_S: f64 = 90.0;
const MIN_REQUEST_TIMEOUT_S: f64 = 15.0;
const MAX_REQUEST_TIMEOUT_S: f64 = 300.0;

/// Engine settings resolved from the environment, overridable by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub request_timeout_s: f64,
    pub gemini_api_base: String,
    pub gemini_api_key: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            text_model: None,
            image_model: None,
            request_timeout_s: DEFAULT_REQUEST_TIMEOUT_S,
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            gemini_api_key: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            text_model: non_empty_env("VENUE_TEXT_MODEL"),
            image_model: non_empty_env("VENUE_IMAGE_MODEL"),
            request_timeout_s: parse_timeout(non_empty_env("VENUE_REQUEST_TIMEOUT").as_deref()),
            gemini_api_base: non_empty_env("GEMINI_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            gemini_api_key: non_empty_env("GEMINI_API_KEY")
                .or_else(|| non_empty_env("GOOGLE_API_KEY")),
        }
    }

    pub fn with_text_model(mut self, model: Option<String>) -> Self {
        if model.is_some() {
            self.text_model = model;
        }
        self
    }

    pub fn with_image_model(mut self, model: Option<String>) -> Self {
        if model.is_some() {
            self.image_model = model;
        }
        self
    }

    pub fn with_request_timeout(mut self, seconds: Option<f64>) -> Self {
        if let Some(seconds) = seconds {
            self.request_timeout_s = clamp_timeout(seconds);
        }
        self
    }
}

fn parse_timeout(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .map(clamp_timeout)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_S)
}

fn clamp_timeout(seconds: f64) -> f64 {
    if !seconds.is_finite() {
        return DEFAULT_REQUEST_TIMEOUT_S;
    }
    seconds.clamp(MIN_REQUEST_TIMEOUT_S, MAX_REQUEST_TIMEOUT_S)
}

pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
