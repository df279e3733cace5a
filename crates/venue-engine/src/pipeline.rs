use anyhow::{Context, Result};
use tracing::{error, info, warn};
use venue_contracts::blueprint::Blueprint;
use venue_contracts::media::{LocationSpec, MediaAsset};
use venue_contracts::models::{
    ModelRegistry, ModelSelector, ModelSpec, CAPABILITY_IMAGE, CAPABILITY_VISION,
};
use venue_contracts::progress::ProgressSink;
use venue_contracts::views::RenderedView;

use crate::blueprint::{compose_analysis_summary, AnalysisRequest, BlueprintGenerator};
use crate::cleanup::ImageCleaner;
use crate::client::{default_client_registry, ClientRegistry, GenerativeClient};
use crate::config::EngineConfig;
use crate::error::GenerationError;
use crate::render::{all_fallback_views, RenderGenerator, RenderSources};

/// Upload → cleanup → blueprint → (review) → render orchestration.
///
/// Every call runs its model requests one after another; nothing is shared
/// between invocations except the progress sink passed in.
pub struct Pipeline {
    clients: ClientRegistry,
    text_model: ModelSpec,
    image_model: ModelSpec,
    model_notes: Vec<String>,
}

impl Pipeline {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Self::with_parts(
            default_client_registry(config)?,
            ModelRegistry::new(None),
            config.text_model.as_deref(),
            config.image_model.as_deref(),
        )
    }

    pub fn with_parts(
        clients: ClientRegistry,
        models: ModelRegistry,
        text_model: Option<&str>,
        image_model: Option<&str>,
    ) -> Result<Self> {
        let selector = ModelSelector::new(Some(models));
        let text = selector.select(text_model, CAPABILITY_VISION)?;
        let image = selector.select(image_model, CAPABILITY_IMAGE)?;

        let model_notes = [text.fallback_reason, image.fallback_reason]
            .into_iter()
            .flatten()
            .collect::<Vec<String>>();
        for note in &model_notes {
            info!("{note}");
        }

        Ok(Self {
            clients,
            text_model: text.model,
            image_model: image.model,
            model_notes,
        })
    }

    pub fn text_model(&self) -> &str {
        &self.text_model.name
    }

    pub fn image_model(&self) -> &str {
        &self.image_model.name
    }

    /// Explanations for models chosen other than the requested ones.
    pub fn model_notes(&self) -> &[String] {
        &self.model_notes
    }

    fn client_for(&self, model: &ModelSpec) -> Result<&dyn GenerativeClient> {
        self.clients.get(&model.provider).with_context(|| {
            format!(
                "no client registered for provider '{}' (model '{}')",
                model.provider, model.name
            )
        })
    }

    /// Pre-cleans supported images. Never fails: without an image client the
    /// input comes back unchanged.
    pub fn clean_assets(
        &self,
        assets: &[MediaAsset],
        progress: &dyn ProgressSink,
    ) -> Vec<MediaAsset> {
        match self.client_for(&self.image_model) {
            Ok(client) => ImageCleaner::new(client, &self.image_model.name).clean(assets, progress),
            Err(err) => {
                warn!("image cleanup skipped: {err:#}");
                assets.to_vec()
            }
        }
    }

    pub fn build_blueprint(
        &self,
        assets: &[MediaAsset],
        prompt: &str,
        location: Option<&LocationSpec>,
        website: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> Result<Blueprint, GenerationError> {
        if assets.is_empty() {
            return Err(GenerationError::NoImages);
        }
        let request = AnalysisRequest {
            prompt,
            location,
            website,
        };

        let cleaned_assets = self.clean_assets(assets, progress);
        progress.report("Analyzing venue layout...");
        let text = self
            .client_for(&self.text_model)
            .and_then(|client| {
                BlueprintGenerator::new(client, &self.text_model.name)
                    .analyze(&cleaned_assets, &request)
            })
            .map_err(|err| {
                error!(model = %self.text_model.name, "blueprint generation failed: {err:#}");
                GenerationError::blueprint(err)
            })?;
        progress.report("Blueprint ready.");

        Ok(Blueprint {
            text,
            original_assets: assets.to_vec(),
            analysis_summary: compose_analysis_summary(assets.len(), &request),
            cleaned_assets,
        })
    }

    /// Renders exactly one view per view spec, or fails with
    /// [`GenerationError::NoImages`] when no supported image exists.
    pub fn render_views(
        &self,
        blueprint: &Blueprint,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<RenderedView>, GenerationError> {
        match self.try_render_views(blueprint, progress) {
            Ok(views) => Ok(views),
            Err(GenerationError::NoImages) => Err(GenerationError::NoImages),
            Err(err) => {
                let detail = std::error::Error::source(&err)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| err.to_string());
                warn!("render stage failed, returning placeholders: {detail}");
                progress.report("Image generation unavailable; showing placeholder views.");
                Ok(all_fallback_views(&blueprint.text))
            }
        }
    }

    fn try_render_views(
        &self,
        blueprint: &Blueprint,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<RenderedView>, GenerationError> {
        let sources = RenderSources::select(blueprint);
        if sources.is_empty() {
            return Err(GenerationError::NoImages);
        }
        let client = self
            .client_for(&self.image_model)
            .map_err(|source| GenerationError::ClientUnavailable { source })?;
        Ok(RenderGenerator::new(client, &self.image_model.name).render(
            blueprint,
            &sources,
            progress,
        ))
    }
}
