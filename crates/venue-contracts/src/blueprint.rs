use serde::{Deserialize, Serialize};

use crate::media::MediaAsset;

/// Venue analysis produced by the text/vision stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub text: String,
    pub original_assets: Vec<MediaAsset>,
    pub cleaned_assets: Vec<MediaAsset>,
    pub analysis_summary: String,
}

impl Blueprint {
    /// Returns a copy carrying reviewer-edited text; assets and summary are kept.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}
