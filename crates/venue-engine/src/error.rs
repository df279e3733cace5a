use thiserror::Error;

pub const NO_IMAGES_MESSAGE: &str =
    "No images available to transform. Please upload at least one venue photo and try again.";
pub const BLUEPRINT_FAILED_MESSAGE: &str =
    "We couldn't analyze your venue right now. Please try again in a moment.";

/// Rejections from the media codec.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{name} is not an image or video ({mime_type})")]
    Unsupported { name: String, mime_type: String },

    #[error("could not determine the media type of {name}")]
    UnknownType { name: String },

    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Stage-level failures surfaced to the caller.
///
/// `Display` is always a fixed, user-safe sentence. The wrapped source is for
/// diagnostic logging only.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{}", NO_IMAGES_MESSAGE)]
    NoImages,

    #[error("{}", BLUEPRINT_FAILED_MESSAGE)]
    Blueprint {
        #[source]
        source: anyhow::Error,
    },

    #[error("image generation client unavailable")]
    ClientUnavailable {
        #[source]
        source: anyhow::Error,
    },
}

impl GenerationError {
    pub fn blueprint(source: anyhow::Error) -> Self {
        Self::Blueprint { source }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
