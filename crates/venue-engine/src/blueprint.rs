//! Venue analysis through the text/vision model.

use anyhow::{bail, Result};
use tracing::debug;
use venue_contracts::media::{LocationSpec, MediaAsset};

use crate::client::{GenerateRequest, GenerativeClient, InlineMedia, ResponseModality};

/// User inputs that shape the analysis instruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisRequest<'a> {
    pub prompt: &'a str,
    pub location: Option<&'a LocationSpec>,
    pub website: Option<&'a str>,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            location: None,
            website: None,
        }
    }

    /// Website with surrounding whitespace removed; empty counts as absent.
    pub fn website(&self) -> Option<&'a str> {
        self.website
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

pub fn build_analysis_instruction(request: &AnalysisRequest<'_>) -> String {
    let mut out = format!("EVENT VISION: {}\n", request.prompt.trim());
    if let Some(location) = request.location {
        out.push_str(&format!("VENUE LOCATION: {location}\n"));
    }
    if let Some(website) = request.website() {
        out.push_str(&format!("VENUE WEBSITE: {website}\n"));
    }
    out.push_str(
        "\nYou are an expert event planner and spatial analyst. Study every attached photo and video \
of the venue and produce a written blueprint for the event described above.

Follow this checklist exactly:
1. VENUE TYPE: identify the kind of venue (ballroom, barn, garden, rooftop, warehouse, restaurant...) \
and its overall character.
2. SPATIAL MAP: describe the layout using directional references (north/south/east/west walls, left/right \
of the entrance). Estimate dimensions in metres from visible reference objects such as doors (about 2.1 m), \
chairs, tables, windows and people. Note ceiling height, entrances, windows, columns and fixed features.
3. CONSTRAINTS: list limitations such as load-bearing columns, uneven floors, narrow access, power outlets, \
acoustic issues, natural light and anything that restricts placement.
4. LAYOUT RECOMMENDATION: for this specific event, recommend where to place the stage or focal point, \
guest seating, bar and catering, dance floor, entrance flow and decor, with approximate sizes and capacities.

Write plain text with the four numbered sections. Be concrete; the blueprint will be used to draw a floor \
plan and photorealistic renders of this exact venue.",
    );
    out
}

/// Short diagnostic line shown next to the blueprint. Not used for control flow.
pub fn compose_analysis_summary(media_count: usize, request: &AnalysisRequest<'_>) -> String {
    let location = request
        .location
        .map(ToString::to_string)
        .unwrap_or_else(|| "Not specified".to_string());
    let website = request.website().unwrap_or("Not specified");
    format!(
        "Analyzed {media_count} media file(s) | Location: {location} | Website: {website} | Vision: {}",
        request.prompt.trim()
    )
}

pub struct BlueprintGenerator<'a> {
    client: &'a dyn GenerativeClient,
    model: &'a str,
}

impl<'a> BlueprintGenerator<'a> {
    pub fn new(client: &'a dyn GenerativeClient, model: &'a str) -> Self {
        Self { client, model }
    }

    /// One call carrying the instruction and every asset; returns the text verbatim.
    pub fn analyze(&self, assets: &[MediaAsset], request: &AnalysisRequest<'_>) -> Result<String> {
        let instruction = build_analysis_instruction(request);
        let generate = GenerateRequest {
            model: self.model.to_string(),
            instruction,
            media: assets.iter().map(InlineMedia::from_asset).collect(),
            modality: ResponseModality::Text,
        };
        debug!(model = %self.model, media = generate.media.len(), "requesting venue blueprint");
        let text = self.client.generate(&generate)?.text();
        if text.trim().is_empty() {
            bail!("{} returned an empty blueprint", self.client.name());
        }
        Ok(text)
    }
}
