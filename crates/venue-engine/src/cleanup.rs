//! Pre-cleaning of uploaded screenshots before they are used as references.

use anyhow::Result;
use tracing::{debug, warn};
use venue_contracts::media::{MediaAsset, MediaKind};
use venue_contracts::progress::ProgressSink;

use crate::client::{GenerateRequest, GenerativeClient, InlineMedia, ResponseModality};

pub const SUPPORTED_IMAGE_MIME_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
];

pub const CLEANED_NAME_PREFIX: &str = "cleaned_";

pub const CLEANUP_INSTRUCTION: &str = "Clean up this venue photo so it can be used as an architectural reference. \
Remove every user-interface element and artifact: app chrome, status bars, browser toolbars, \
navigation overlays, buttons, captions, watermarks, logos, timestamps and compression artifacts. \
Fill the removed areas so they blend naturally with the surrounding scene. \
Do not change the architecture, layout, materials, lighting or perspective of the venue. \
Return only the cleaned image.";

pub fn is_supported_image(asset: &MediaAsset) -> bool {
    let mime = asset.mime_type.trim().to_ascii_lowercase();
    asset.is_image() && SUPPORTED_IMAGE_MIME_TYPES.contains(&mime.as_str())
}

/// Sends each supported image through the image model, one at a time.
pub struct ImageCleaner<'a> {
    client: &'a dyn GenerativeClient,
    model: &'a str,
}

impl<'a> ImageCleaner<'a> {
    pub fn new(client: &'a dyn GenerativeClient, model: &'a str) -> Self {
        Self { client, model }
    }

    /// Cleaned images keep their relative order and come first; everything
    /// else follows in its original order. A failed image is replaced by its
    /// original.
    pub fn clean(&self, assets: &[MediaAsset], progress: &dyn ProgressSink) -> Vec<MediaAsset> {
        let (cleanable, pass_through): (Vec<&MediaAsset>, Vec<&MediaAsset>) =
            assets.iter().partition(|asset| is_supported_image(asset));
        if cleanable.is_empty() {
            return assets.to_vec();
        }

        let total = cleanable.len();
        progress.report(&format!("Preparing {total} image(s) for cleanup..."));

        let mut cleaned_count = 0usize;
        let mut out = Vec::with_capacity(assets.len());
        for (idx, asset) in cleanable.into_iter().enumerate() {
            progress.report(&format!(
                "Cleaning image {} of {total}: {}...",
                idx + 1,
                asset.name
            ));
            match self.clean_one(asset) {
                Ok(Some(cleaned)) => {
                    cleaned_count += 1;
                    out.push(cleaned);
                }
                Ok(None) => {
                    debug!(asset = %asset.name, "cleanup returned no image; keeping original");
                    out.push(asset.clone());
                }
                Err(err) => {
                    warn!(asset = %asset.name, "image cleanup failed, keeping original: {err:#}");
                    out.push(asset.clone());
                }
            }
        }
        out.extend(pass_through.into_iter().cloned());

        progress.report(&format!(
            "Image cleanup complete ({cleaned_count} of {total} cleaned)."
        ));
        out
    }

    fn clean_one(&self, asset: &MediaAsset) -> Result<Option<MediaAsset>> {
        let request = GenerateRequest {
            model: self.model.to_string(),
            instruction: CLEANUP_INSTRUCTION.to_string(),
            media: vec![InlineMedia::from_asset(asset)],
            modality: ResponseModality::TextAndImage,
        };
        let response = self.client.generate(&request)?;
        let Some(image) = response.first_inline_data() else {
            return Ok(None);
        };
        let mime_type = Some(image.mime_type.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| asset.mime_type.clone());
        Ok(Some(MediaAsset {
            payload: crate::codec::data_uri(&mime_type, &image.data),
            kind: MediaKind::from_mime(&mime_type).unwrap_or(asset.kind),
            mime_type,
            name: format!("{CLEANED_NAME_PREFIX}{}", asset.name),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::bail;

    use super::*;
    use crate::testing::{image_asset, image_response, video_asset, ProgressLog, ScriptedClient};

    #[test]
    fn video_only_input_passes_through_unchanged() {
        let client = Arc::new(ScriptedClient::new(|_| bail!("must not be called")));
        let assets = vec![video_asset("tour.mp4"), video_asset("drone.webm")];
        let progress = ProgressLog::default();

        let out = ImageCleaner::new(&*client, "mock-image").clean(&assets, &progress);

        assert_eq!(out, assets);
        assert_eq!(client.call_count(), 0);
        assert!(progress.messages().is_empty());
    }

    #[test]
    fn failed_asset_keeps_original_at_same_position() {
        let assets = vec![
            image_asset("one.jpg", "T05F"),
            image_asset("two.jpg", "VFdP"),
            image_asset("three.jpg", "VEhS"),
        ];
        let failing = crate::codec::strip(&assets[1]).to_string();
        let client = Arc::new(ScriptedClient::new(move |request| {
            if request.media[0].data == failing {
                bail!("upstream 503");
            }
            Ok(image_response("image/png", "Q0xFQU4="))
        }));

        let out = ImageCleaner::new(&*client, "mock-image")
            .clean(&assets, &crate::testing::silent());

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].name, "cleaned_one.jpg");
        assert_eq!(out[0].payload, "data:image/png;base64,Q0xFQU4=");
        assert_eq!(out[0].mime_type, "image/png");
        assert_eq!(out[1], assets[1]);
        assert_eq!(out[2].name, "cleaned_three.jpg");
        assert_eq!(client.call_count(), 3);
    }

    #[test]
    fn pass_through_assets_follow_cleaned_images() {
        let assets = vec![
            video_asset("intro.mp4"),
            image_asset("hall.png", "SEFMTA=="),
            video_asset("outro.mp4"),
            image_asset("deck.webp", "REVDSw=="),
        ];
        let client = Arc::new(ScriptedClient::new(|_| Ok(image_response("", "Q0xFQU4="))));

        let out = ImageCleaner::new(&*client, "mock-image")
            .clean(&assets, &crate::testing::silent());

        let names: Vec<&str> = out.iter().map(|asset| asset.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["cleaned_hall.png", "cleaned_deck.webp", "intro.mp4", "outro.mp4"]
        );
        // No MIME in the response: keep the original one.
        assert_eq!(out[1].mime_type, "image/webp");
    }

    #[test]
    fn response_without_image_keeps_original() {
        let assets = vec![image_asset("hall.heic", "SEVJQw==")];
        let client = Arc::new(ScriptedClient::new(|_| {
            Ok(crate::testing::text_response("no image"))
        }));

        let out = ImageCleaner::new(&*client, "mock-image")
            .clean(&assets, &crate::testing::silent());

        assert_eq!(out, assets);
    }

    #[test]
    fn progress_reports_start_each_asset_and_completion() {
        let assets = vec![image_asset("a.jpg", "QQ=="), image_asset("b.jpg", "Qg==")];
        let client = Arc::new(ScriptedClient::new(|_| bail!("offline")));
        let progress = ProgressLog::default();

        ImageCleaner::new(&*client, "mock-image").clean(&assets, &progress);

        assert_eq!(
            progress.messages(),
            vec![
                "Preparing 2 image(s) for cleanup...".to_string(),
                "Cleaning image 1 of 2: a.jpg...".to_string(),
                "Cleaning image 2 of 2: b.jpg...".to_string(),
                "Image cleanup complete (0 of 2 cleaned).".to_string(),
            ]
        );
    }

    #[test]
    fn whitelist_is_case_insensitive_and_excludes_gif() {
        let mut upper = image_asset("a.PNG", "QQ==");
        upper.mime_type = "IMAGE/PNG".to_string();
        assert!(is_supported_image(&upper));
        let mut gif = image_asset("a.gif", "QQ==");
        gif.mime_type = "image/gif".to_string();
        assert!(!is_supported_image(&gif));
        assert!(!is_supported_image(&video_asset("a.mp4")));
        let mut mislabeled = video_asset("clip.mp4");
        mislabeled.mime_type = "image/png".to_string();
        assert!(!is_supported_image(&mislabeled));
    }
}
