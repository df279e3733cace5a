//! Shared fixtures for engine unit tests.

use std::cell::RefCell;
use std::sync::Mutex;

use anyhow::Result;
use venue_contracts::media::{MediaAsset, MediaKind};
use venue_contracts::progress::{ProgressSink, SilentProgress};

use crate::cleanup::CLEANUP_INSTRUCTION;
use crate::client::{
    GenerateRequest, GenerateResponse, GenerativeClient, InlineMedia, ResponseModality,
    ResponsePart,
};

type Handler = dyn Fn(&GenerateRequest) -> Result<GenerateResponse> + Send + Sync;

/// Closure-driven client that records every request it receives.
pub struct ScriptedClient {
    handler: Box<Handler>,
    calls: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedClient {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&GenerateRequest) -> Result<GenerateResponse> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GenerateRequest> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

impl GenerativeClient for ScriptedClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        (self.handler)(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Cleanup,
    Blueprint,
    Render,
}

pub fn call_kind(request: &GenerateRequest) -> CallKind {
    match request.modality {
        ResponseModality::Text => CallKind::Blueprint,
        ResponseModality::TextAndImage if request.instruction == CLEANUP_INSTRUCTION => {
            CallKind::Cleanup
        }
        ResponseModality::TextAndImage => CallKind::Render,
    }
}

#[derive(Default)]
pub struct ProgressLog {
    messages: RefCell<Vec<String>>,
}

impl ProgressLog {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl ProgressSink for ProgressLog {
    fn report(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

pub fn silent() -> SilentProgress {
    SilentProgress
}

fn mime_for_test_name(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else if lower.ends_with(".heic") {
        "image/heic"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webm") {
        "video/webm"
    } else if lower.ends_with(".mp4") {
        "video/mp4"
    } else {
        "image/jpeg"
    }
}

pub fn image_asset(name: &str, base64_data: &str) -> MediaAsset {
    let mime_type = mime_for_test_name(name);
    MediaAsset {
        payload: format!("data:{mime_type};base64,{base64_data}"),
        mime_type: mime_type.to_string(),
        kind: MediaKind::Image,
        name: name.to_string(),
    }
}

pub fn video_asset(name: &str) -> MediaAsset {
    let mime_type = mime_for_test_name(name);
    MediaAsset {
        payload: format!("data:{mime_type};base64,AAAAIGZ0eXA="),
        mime_type: mime_type.to_string(),
        kind: MediaKind::Video,
        name: name.to_string(),
    }
}

pub fn image_response(mime_type: &str, base64_data: &str) -> GenerateResponse {
    GenerateResponse {
        parts: vec![
            ResponsePart::Text("Done.".to_string()),
            ResponsePart::InlineData(InlineMedia {
                mime_type: mime_type.to_string(),
                data: base64_data.to_string(),
            }),
        ],
    }
}

pub fn text_response(text: &str) -> GenerateResponse {
    GenerateResponse {
        parts: vec![ResponsePart::Text(text.to_string())],
    }
}
