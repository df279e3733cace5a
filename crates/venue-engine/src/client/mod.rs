mod dryrun;
mod gemini;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use venue_contracts::media::MediaAsset;

use crate::codec;
use crate::config::EngineConfig;

pub use dryrun::DryrunClient;
pub use gemini::GeminiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseModality {
    Text,
    TextAndImage,
}

/// Binary payload travelling to or from a model, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMedia {
    pub mime_type: String,
    pub data: String,
}

impl InlineMedia {
    pub fn from_asset(asset: &MediaAsset) -> Self {
        Self {
            mime_type: asset.mime_type.clone(),
            data: codec::strip(asset).to_string(),
        }
    }

    pub fn to_data_uri(&self) -> String {
        codec::data_uri(&self.mime_type, &self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub model: String,
    pub instruction: String,
    pub media: Vec<InlineMedia>,
    pub modality: ResponseModality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Text(String),
    InlineData(InlineMedia),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    pub parts: Vec<ResponsePart>,
}

impl GenerateResponse {
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ResponsePart::Text(text) => Some(text.as_str()),
                ResponsePart::InlineData(_) => None,
            })
            .collect::<Vec<&str>>()
            .join("")
    }

    pub fn first_inline_data(&self) -> Option<&InlineMedia> {
        self.parts.iter().find_map(|part| match part {
            ResponsePart::InlineData(media) if !media.data.is_empty() => Some(media),
            _ => None,
        })
    }
}

/// A generative text/vision or image model endpoint.
pub trait GenerativeClient: Send + Sync {
    fn name(&self) -> &str;
    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

impl<T: GenerativeClient + ?Sized> GenerativeClient for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        (**self).generate(request)
    }
}

#[derive(Default)]
pub struct ClientRegistry {
    clients: BTreeMap<String, Box<dyn GenerativeClient>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: GenerativeClient + 'static>(&mut self, client: C) {
        self.clients
            .insert(client.name().to_string(), Box::new(client));
    }

    pub fn get(&self, name: &str) -> Option<&dyn GenerativeClient> {
        self.clients.get(name).map(|client| client.as_ref())
    }

    pub fn names(&self) -> Vec<String> {
        self.clients.keys().cloned().collect()
    }
}

pub fn default_client_registry(config: &EngineConfig) -> Result<ClientRegistry> {
    let mut clients = ClientRegistry::new();
    clients.register(DryrunClient);
    clients.register(GeminiClient::new(config)?);
    Ok(clients)
}

#[cfg(test)]
mod tests {
    use venue_contracts::media::{MediaAsset, MediaKind};

    use super::*;

    #[test]
    fn response_helpers_pick_text_and_first_non_empty_image() {
        let response = GenerateResponse {
            parts: vec![
                ResponsePart::Text("Here is ".to_string()),
                ResponsePart::InlineData(InlineMedia {
                    mime_type: "image/png".to_string(),
                    data: String::new(),
                }),
                ResponsePart::Text("your render".to_string()),
                ResponsePart::InlineData(InlineMedia {
                    mime_type: "image/jpeg".to_string(),
                    data: "QUJD".to_string(),
                }),
            ],
        };
        assert_eq!(response.text(), "Here is your render");
        assert_eq!(
            response.first_inline_data().map(InlineMedia::to_data_uri),
            Some("data:image/jpeg;base64,QUJD".to_string())
        );
        assert!(GenerateResponse::default().first_inline_data().is_none());
    }

    #[test]
    fn inline_media_from_asset_strips_header() {
        let asset = MediaAsset {
            payload: "data:image/webp;base64,UklG".to_string(),
            mime_type: "image/webp".to_string(),
            kind: MediaKind::Image,
            name: "deck.webp".to_string(),
        };
        let media = InlineMedia::from_asset(&asset);
        assert_eq!(media.data, "UklG");
        assert_eq!(media.mime_type, "image/webp");
    }

    #[test]
    fn default_registry_includes_gemini_and_dryrun() -> anyhow::Result<()> {
        let registry = default_client_registry(&EngineConfig::default())?;
        assert_eq!(registry.names(), vec!["dryrun", "gemini"]);
        assert!(registry.get("gemini").is_some());
        assert!(registry.get("openai").is_none());
        Ok(())
    }
}
