use std::time::Duration;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{
    GenerateRequest, GenerateResponse, GenerativeClient, InlineMedia, ResponseModality,
    ResponsePart,
};
use crate::config::EngineConfig;

pub struct GeminiClient {
    api_base: String,
    api_key: Option<String>,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs_f64(config.request_timeout_s))
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(Self {
            api_base: config.gemini_api_base.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            http,
        })
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn build_parts(request: &GenerateRequest) -> Vec<Value> {
        let mut parts = request
            .media
            .iter()
            .map(|media| {
                json!({
                    "inlineData": {
                        "mimeType": media.mime_type,
                        "data": media.data,
                    }
                })
            })
            .collect::<Vec<Value>>();
        parts.push(json!({ "text": request.instruction }));
        parts
    }

    fn build_payload(request: &GenerateRequest) -> Value {
        let mut payload = Map::new();
        payload.insert(
            "contents".to_string(),
            Value::Array(vec![json!({
                "role": "user",
                "parts": Self::build_parts(request),
            })]),
        );
        if request.modality == ResponseModality::TextAndImage {
            payload.insert(
                "generationConfig".to_string(),
                json!({ "responseModalities": ["TEXT", "IMAGE"] }),
            );
        }
        payload.insert(
            "safetySettings".to_string(),
            Value::Array(Self::default_safety_settings()),
        );
        Value::Object(payload)
    }

    fn default_safety_settings() -> Vec<Value> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| {
            json!({
                "category": category,
                "threshold": "OFF",
            })
        })
        .collect()
    }

    fn extract_parts(response_payload: &Value) -> Vec<ResponsePart> {
        let candidates = response_payload
            .get("candidates")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut out = Vec::new();

        for candidate in candidates {
            let parts = candidate
                .get("content")
                .and_then(|content| content.get("parts"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for part in parts {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    out.push(ResponsePart::Text(text.to_string()));
                    continue;
                }
                let inline = part
                    .get("inlineData")
                    .or_else(|| part.get("inline_data"))
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                let data = inline
                    .get("data")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if data.is_empty() {
                    continue;
                }
                if BASE64.decode(data.as_bytes()).is_err() {
                    debug!("skipping Gemini inline part with undecodable base64");
                    continue;
                }
                let mime_type = inline
                    .get("mimeType")
                    .or_else(|| inline.get("mime_type"))
                    .and_then(Value::as_str)
                    .unwrap_or("image/png")
                    .to_string();
                out.push(ResponsePart::InlineData(InlineMedia {
                    mime_type,
                    data: data.to_string(),
                }));
            }
        }

        out
    }
}

impl GenerativeClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("GEMINI_API_KEY or GOOGLE_API_KEY not set");
        };
        let endpoint = self.endpoint_for_model(&request.model);
        let payload = Self::build_payload(request);
        debug!(
            model = %request.model,
            media = request.media.len(),
            "sending Gemini generateContent request"
        );

        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        let response_payload = response_json_or_error("Gemini", response)?;
        Ok(GenerateResponse {
            parts: Self::extract_parts(&response_payload),
        })
    }
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(modality: ResponseModality) -> GenerateRequest {
        GenerateRequest {
            model: "gemini-2.5-flash-image".to_string(),
            instruction: "Render the floor plan".to_string(),
            media: vec![InlineMedia {
                mime_type: "image/jpeg".to_string(),
                data: "QUJD".to_string(),
            }],
            modality,
        }
    }

    #[test]
    fn endpoint_prefixes_models_path_once() -> anyhow::Result<()> {
        let client = GeminiClient::new(&EngineConfig {
            gemini_api_base: "https://example.test/v1beta/".to_string(),
            ..EngineConfig::default()
        })?;
        assert_eq!(
            client.endpoint_for_model("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            client.endpoint_for_model(" models/gemini-2.5-flash "),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        Ok(())
    }

    #[test]
    fn payload_puts_media_before_instruction() {
        let payload = GeminiClient::build_payload(&request(ResponseModality::TextAndImage));
        let parts = &payload["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], json!("image/jpeg"));
        assert_eq!(parts[0]["inlineData"]["data"], json!("QUJD"));
        assert_eq!(parts[1]["text"], json!("Render the floor plan"));
        assert_eq!(
            payload["generationConfig"]["responseModalities"],
            json!(["TEXT", "IMAGE"])
        );
        assert_eq!(payload["safetySettings"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn text_payload_omits_image_modality() {
        let payload = GeminiClient::build_payload(&request(ResponseModality::Text));
        assert!(payload.get("generationConfig").is_none());
    }

    #[test]
    fn extract_parts_accepts_both_key_spellings() {
        let response = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Cleaned."},
                    {"inline_data": {"mime_type": "image/webp", "data": "UklG"}},
                    {"inlineData": {"mimeType": "image/png", "data": "!!not base64!!"}},
                    {"inlineData": {"data": "QUJD"}}
                ]}
            }]
        });
        let parts = GeminiClient::extract_parts(&response);
        assert_eq!(
            parts,
            vec![
                ResponsePart::Text("Cleaned.".to_string()),
                ResponsePart::InlineData(InlineMedia {
                    mime_type: "image/webp".to_string(),
                    data: "UklG".to_string(),
                }),
                ResponsePart::InlineData(InlineMedia {
                    mime_type: "image/png".to_string(),
                    data: "QUJD".to_string(),
                }),
            ]
        );
        assert!(GeminiClient::extract_parts(&json!({})).is_empty());
    }

    #[test]
    fn missing_api_key_fails_before_network() -> anyhow::Result<()> {
        let client = GeminiClient::new(&EngineConfig::default())?;
        let err = client
            .generate(&request(ResponseModality::Text))
            .err()
            .map(|err| err.to_string())
            .unwrap_or_default();
        assert_eq!(err, "GEMINI_API_KEY or GOOGLE_API_KEY not set");
        Ok(())
    }

    #[test]
    fn truncate_text_marks_cut() {
        assert_eq!(truncate_text("abcdef", 3), "abc…");
        assert_eq!(truncate_text("abc", 3), "abc");
    }
}
