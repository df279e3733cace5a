//! Conversion between raw uploaded files and transport-ready [`MediaAsset`]s.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use venue_contracts::media::{MediaAsset, MediaKind};

use crate::error::MediaError;

/// A user-selected file before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMedia {
    pub name: String,
    pub bytes: Vec<u8>,
    pub declared_mime: Option<String>,
}

impl RawMedia {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            declared_mime: None,
        }
    }

    pub fn with_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.declared_mime = Some(mime_type.into());
        self
    }

    pub fn from_path(path: &Path) -> Result<Self, MediaError> {
        let bytes = fs::read(path).map_err(|source| MediaError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(name, bytes))
    }
}

/// Declared MIME first, then byte sniffing, then the file extension.
pub fn detect_mime(raw: &RawMedia) -> Option<String> {
    if let Some(declared) = raw
        .declared_mime
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return Some(declared.to_ascii_lowercase());
    }
    if let Ok(format) = image::guess_format(&raw.bytes) {
        return Some(format.to_mime_type().to_string());
    }
    mime_for_name(&raw.name).map(str::to_string)
}

fn mime_for_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name)
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "mp4" | "m4v" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}

/// Encodes a raw file into a self-describing asset. Only `image/*` and
/// `video/*` are accepted.
pub fn encode(raw: &RawMedia) -> Result<MediaAsset, MediaError> {
    let Some(mime_type) = detect_mime(raw) else {
        return Err(MediaError::UnknownType {
            name: raw.name.clone(),
        });
    };
    let Some(kind) = MediaKind::from_mime(&mime_type) else {
        return Err(MediaError::Unsupported {
            name: raw.name.clone(),
            mime_type,
        });
    };
    Ok(MediaAsset {
        payload: data_uri(&mime_type, &BASE64.encode(&raw.bytes)),
        mime_type,
        kind,
        name: raw.name.clone(),
    })
}

/// The base64 body of the asset without its `data:<mime>;base64,` header.
pub fn strip(asset: &MediaAsset) -> &str {
    strip_payload(&asset.payload)
}

pub fn strip_payload(payload: &str) -> &str {
    if !payload.starts_with("data:") {
        return payload;
    }
    match payload.split_once(',') {
        Some((_, body)) => body,
        None => payload,
    }
}

pub fn data_uri(mime_type: &str, base64_data: &str) -> String {
    format!("data:{mime_type};base64,{base64_data}")
}

/// Splits a base64 data URI into its MIME type and decoded bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let Some(rest) = uri.strip_prefix("data:") else {
        bail!("not a data URI");
    };
    let Some((header, body)) = rest.split_once(',') else {
        bail!("data URI has no payload separator");
    };
    let Some(mime_type) = header.strip_suffix(";base64") else {
        bail!("data URI is not base64 encoded");
    };
    let bytes = BASE64
        .decode(body.as_bytes())
        .context("data URI base64 decode failed")?;
    Ok((mime_type.to_string(), bytes))
}

/// File extension for a MIME type when writing rendered views to disk.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/gif" => "gif",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};
    use venue_contracts::media::MediaKind;

    use super::*;

    fn png_bytes() -> Vec<u8> {
        let image = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn encode_sniffs_png_even_with_misleading_name() -> anyhow::Result<()> {
        let asset = encode(&RawMedia::new("hall.jpg", png_bytes()))?;
        assert_eq!(asset.mime_type, "image/png");
        assert_eq!(asset.kind, MediaKind::Image);
        assert!(asset.payload.starts_with("data:image/png;base64,"));
        assert_eq!(asset.name, "hall.jpg");
        Ok(())
    }

    #[test]
    fn encode_uses_extension_for_video() -> anyhow::Result<()> {
        let asset = encode(&RawMedia::new("walkthrough.MOV", vec![0, 0, 0, 20]))?;
        assert_eq!(asset.mime_type, "video/quicktime");
        assert_eq!(asset.kind, MediaKind::Video);
        Ok(())
    }

    #[test]
    fn encode_rejects_non_media() {
        let pdf = RawMedia::new("menu.pdf", b"%PDF-1.7".to_vec()).with_mime("application/pdf");
        assert!(matches!(
            encode(&pdf),
            Err(MediaError::Unsupported { mime_type, .. }) if mime_type == "application/pdf"
        ));
        let unknown = RawMedia::new("notes", b"hello".to_vec());
        assert!(matches!(encode(&unknown), Err(MediaError::UnknownType { .. })));
        let bare = RawMedia::new("clip", b"hello".to_vec()).with_mime("video");
        assert!(matches!(encode(&bare), Err(MediaError::Unsupported { .. })));
    }

    #[test]
    fn strip_removes_declaration_and_tolerates_bare_payload() -> anyhow::Result<()> {
        let bytes = png_bytes();
        let asset = encode(&RawMedia::new("a.png", bytes.clone()))?;
        assert_eq!(strip(&asset), BASE64.encode(&bytes));
        assert_eq!(strip_payload("QUJD"), "QUJD");
        assert_eq!(strip_payload("data:image/png;base64"), "data:image/png;base64");
        Ok(())
    }

    #[test]
    fn decode_data_uri_recovers_mime_and_bytes() -> anyhow::Result<()> {
        let (mime, bytes) = decode_data_uri(&data_uri("image/svg+xml", &BASE64.encode("<svg/>")))?;
        assert_eq!(mime, "image/svg+xml");
        assert_eq!(bytes, b"<svg/>");
        assert!(decode_data_uri("QUJD").is_err());
        assert_eq!(extension_for_mime(&mime), "svg");
        Ok(())
    }
}
