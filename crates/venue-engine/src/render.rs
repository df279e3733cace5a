//! Generation of the three labeled views from a blueprint.

use anyhow::Result;
use tracing::{debug, warn};
use venue_contracts::blueprint::Blueprint;
use venue_contracts::media::MediaAsset;
use venue_contracts::progress::ProgressSink;
use venue_contracts::views::{RenderSource, RenderedView, ViewSpec, VIEW_SPECS};

use crate::cleanup::{is_supported_image, CLEANED_NAME_PREFIX};
use crate::client::{GenerateRequest, GenerativeClient, InlineMedia, ResponseModality};
use crate::fallback::{fallback_description, placeholder_for};

/// Reference images for rendering: supported cleaned images, else supported
/// originals. `pre_cleaned` is set only when at least one selected image
/// actually came back from cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSources<'a> {
    pub images: Vec<&'a MediaAsset>,
    pub pre_cleaned: bool,
}

impl<'a> RenderSources<'a> {
    pub fn select(blueprint: &'a Blueprint) -> Self {
        let mut images = supported_images(&blueprint.cleaned_assets);
        if images.is_empty() {
            images = supported_images(&blueprint.original_assets);
        }
        let pre_cleaned = images
            .iter()
            .any(|asset| asset.name.starts_with(CLEANED_NAME_PREFIX));
        Self {
            images,
            pre_cleaned,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn supported_images(assets: &[MediaAsset]) -> Vec<&MediaAsset> {
    assets.iter().filter(|asset| is_supported_image(asset)).collect()
}

pub fn render_trailer(image_count: usize, pre_cleaned: bool) -> String {
    let cleaned = if pre_cleaned {
        "pre-cleaned to remove UI artifacts"
    } else {
        "original uploads, not pre-cleaned"
    };
    format!("\n\nREFERENCE IMAGES: {image_count} venue image(s) attached ({cleaned}).")
}

pub fn fallback_view(spec: &ViewSpec, blueprint_text: &str) -> RenderedView {
    RenderedView {
        image_data: placeholder_for(spec.label, blueprint_text),
        description: fallback_description(spec.label),
        label: spec.label.to_string(),
        source: RenderSource::Fallback,
    }
}

/// Every view as a placeholder, in declaration order.
pub fn all_fallback_views(blueprint_text: &str) -> Vec<RenderedView> {
    VIEW_SPECS
        .iter()
        .map(|spec| fallback_view(spec, blueprint_text))
        .collect()
}

pub struct RenderGenerator<'a> {
    client: &'a dyn GenerativeClient,
    model: &'a str,
}

impl<'a> RenderGenerator<'a> {
    pub fn new(client: &'a dyn GenerativeClient, model: &'a str) -> Self {
        Self { client, model }
    }

    /// Renders every view in order. A failed view becomes its placeholder and
    /// never stops later views.
    pub fn render(
        &self,
        blueprint: &Blueprint,
        sources: &RenderSources<'_>,
        progress: &dyn ProgressSink,
    ) -> Vec<RenderedView> {
        let media: Vec<InlineMedia> = sources
            .images
            .iter()
            .map(|asset| InlineMedia::from_asset(asset))
            .collect();
        let trailer = render_trailer(media.len(), sources.pre_cleaned);
        let total = VIEW_SPECS.len();

        let mut views = Vec::with_capacity(total);
        for (idx, spec) in VIEW_SPECS.iter().enumerate() {
            progress.report(&format!(
                "Generating {} ({} of {total})...",
                spec.label,
                idx + 1
            ));
            let view = match self.render_one(spec, blueprint, &media, &trailer) {
                Ok(Some(view)) => view,
                Ok(None) => {
                    warn!(view = spec.label, "image model returned no image; using placeholder");
                    fallback_view(spec, &blueprint.text)
                }
                Err(err) => {
                    warn!(view = spec.label, "view generation failed, using placeholder: {err:#}");
                    fallback_view(spec, &blueprint.text)
                }
            };
            views.push(view);
        }

        let fallbacks = views.iter().filter(|view| view.is_fallback()).count();
        progress.report(&format!(
            "Render complete: {} generated, {fallbacks} placeholder(s).",
            total - fallbacks
        ));
        views
    }

    fn render_one(
        &self,
        spec: &ViewSpec,
        blueprint: &Blueprint,
        media: &[InlineMedia],
        trailer: &str,
    ) -> Result<Option<RenderedView>> {
        let mut instruction = spec.instruction_for(&blueprint.text);
        instruction.push_str(trailer);
        let request = GenerateRequest {
            model: self.model.to_string(),
            instruction,
            media: media.to_vec(),
            modality: ResponseModality::TextAndImage,
        };
        debug!(view = spec.label, media = media.len(), "requesting view render");
        let response = self.client.generate(&request)?;
        Ok(response.first_inline_data().map(|image| RenderedView {
            image_data: image.to_data_uri(),
            description: format!(
                "AI-generated {} for your event, based on the venue blueprint.",
                spec.label
            ),
            label: spec.label.to_string(),
            source: RenderSource::Generated,
        }))
    }
}
