mod library;
mod location;

use serde::{Deserialize, Serialize};

pub use library::MediaLibrary;
pub use location::LocationSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Infers the kind from the MIME top-level type. A subtype is required.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let (top, subtype) = mime_type.trim().split_once('/')?;
        if subtype.trim().is_empty() {
            return None;
        }
        match top.trim().to_ascii_lowercase().as_str() {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// One uploaded venue file in transport form.
///
/// `payload` is a self-describing data URI (`data:<mime>;base64,<data>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub payload: String,
    pub mime_type: String,
    pub kind: MediaKind,
    pub name: String,
}

impl MediaAsset {
    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }
}
