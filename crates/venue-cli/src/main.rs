use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use venue_contracts::blueprint::Blueprint;
use venue_contracts::events::EventWriter;
use venue_contracts::media::{LocationSpec, MediaLibrary};
use venue_contracts::progress::ProgressSink;
use venue_contracts::runs::summary::{now_utc_iso, write_summary, RunSummary};
use venue_contracts::views::RenderedView;
use venue_engine::cleanup::CLEANED_NAME_PREFIX;
use venue_engine::codec::{self, RawMedia};
use venue_engine::{EngineConfig, GenerationError, MediaError, Pipeline};

#[derive(Debug, Parser)]
#[command(
    name = "venue-rs",
    version,
    about = "Floor plans and event renders from venue photos"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clean uploads and write a venue blueprint for review.
    Analyze(AnalyzeArgs),
    /// Render the three views from a (possibly edited) blueprint.
    Render(RenderArgs),
    /// Analyze and render in one go.
    Run(AnalyzeArgs),
}

#[derive(Debug, Args)]
struct RunDirArgs {
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ModelArgs {
    #[arg(long)]
    text_model: Option<String>,
    #[arg(long)]
    image_model: Option<String>,
    #[arg(long)]
    request_timeout: Option<f64>,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    #[arg(long = "media", num_args = 1..)]
    media: Vec<PathBuf>,
    #[arg(long)]
    prompt: String,
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    location: Option<String>,
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
    #[arg(long)]
    website: Option<String>,
    #[command(flatten)]
    run_dir: RunDirArgs,
    #[command(flatten)]
    models: ModelArgs,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[arg(long)]
    blueprint: PathBuf,
    /// Reviewed blueprint text that replaces the generated one.
    #[arg(long)]
    text: Option<PathBuf>,
    #[command(flatten)]
    run_dir: RunDirArgs,
    #[command(flatten)]
    models: ModelArgs,
}

fn main() {
    init_tracing();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("venue-rs error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => run_analyze(args, false),
        Command::Run(args) => run_analyze(args, true),
        Command::Render(args) => run_render(args),
    }
}

struct RunContext {
    out_dir: PathBuf,
    run_id: String,
    events: EventWriter,
    started_at: String,
}

impl RunContext {
    fn open(args: &RunDirArgs) -> Result<Self> {
        let out_dir = args.out.clone().unwrap_or_else(|| {
            PathBuf::from("runs").join(format!("run-{}", Uuid::new_v4().simple()))
        });
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
        let run_id = out_dir
            .file_name()
            .and_then(|value| value.to_str())
            .filter(|value| !value.is_empty())
            .unwrap_or("run-rs")
            .to_string();
        let events_path = args
            .events
            .clone()
            .unwrap_or_else(|| out_dir.join("events.jsonl"));
        let events = EventWriter::new(events_path, run_id.clone());
        events.emit(
            "run_started",
            json_object(json!({ "out_dir": out_dir.to_string_lossy() })),
        )?;
        Ok(Self {
            out_dir,
            run_id,
            events,
            started_at: now_utc_iso(),
        })
    }

    fn progress(&self, stage: &'static str) -> CliProgress {
        CliProgress {
            events: self.events.clone(),
            stage,
        }
    }

    /// Records a stage failure. `media_count` and `cleaned_count` are whatever
    /// was known when the stage failed.
    fn fail(
        &self,
        stage: &str,
        err: &GenerationError,
        media_count: usize,
        cleaned_count: usize,
    ) -> Result<i32> {
        self.events.emit(
            "generation_failed",
            json_object(json!({
                "stage": stage,
                "message": err.user_message(),
            })),
        )?;
        let summary = RunSummary {
            run_id: self.run_id.clone(),
            started_at: self.started_at.clone(),
            finished_at: now_utc_iso(),
            media_count: media_count as u64,
            cleaned_count: cleaned_count as u64,
            rendered_views: 0,
            fallback_views: 0,
        };
        let extra = json_object(json!({ "failed_stage": stage, "error": err.user_message() }));
        write_summary(&self.out_dir.join("summary.json"), &summary, Some(&extra))?;
        eprintln!("{}", err.user_message());
        Ok(1)
    }

    fn finish(
        &self,
        pipeline: &Pipeline,
        blueprint: &Blueprint,
        views: &[RenderedView],
    ) -> Result<()> {
        let fallback_views = views.iter().filter(|view| view.is_fallback()).count() as u64;
        let summary = RunSummary {
            run_id: self.run_id.clone(),
            started_at: self.started_at.clone(),
            finished_at: now_utc_iso(),
            media_count: blueprint.original_assets.len() as u64,
            cleaned_count: cleaned_count(blueprint) as u64,
            rendered_views: views.len() as u64 - fallback_views,
            fallback_views,
        };
        let extra = json_object(json!({
            "text_model": pipeline.text_model(),
            "image_model": pipeline.image_model(),
            "model_notes": pipeline.model_notes(),
            "analysis_summary": blueprint.analysis_summary,
        }));
        write_summary(&self.out_dir.join("summary.json"), &summary, Some(&extra))?;
        self.events.emit(
            "run_finished",
            json_object(json!({
                "rendered_views": summary.rendered_views,
                "fallback_views": summary.fallback_views,
            })),
        )?;
        Ok(())
    }
}

/// Prints each status line and mirrors it into `events.jsonl`.
struct CliProgress {
    events: EventWriter,
    stage: &'static str,
}

impl ProgressSink for CliProgress {
    fn report(&self, message: &str) {
        println!("{message}");
        if let Err(err) = self.events.emit_progress(self.stage, message) {
            warn!("failed to record progress event: {err:#}");
        }
    }
}

fn build_pipeline(models: &ModelArgs) -> Result<Pipeline> {
    let config = EngineConfig::from_env()
        .with_text_model(models.text_model.clone())
        .with_image_model(models.image_model.clone())
        .with_request_timeout(models.request_timeout);
    Pipeline::new(&config)
}

fn run_analyze(args: AnalyzeArgs, render_after: bool) -> Result<i32> {
    let ctx = RunContext::open(&args.run_dir)?;
    let pipeline = build_pipeline(&args.models)?;
    let library = load_media(&args.media)?;
    let assets = library.assets();
    let location = location_from_args(args.location.as_deref(), args.lat, args.lon);
    info!(
        media = assets.len(),
        text_model = pipeline.text_model(),
        image_model = pipeline.image_model(),
        "starting venue analysis"
    );

    let blueprint = match pipeline.build_blueprint(
        assets,
        &args.prompt,
        location.as_ref(),
        args.website.as_deref(),
        &ctx.progress("analyze"),
    ) {
        Ok(blueprint) => blueprint,
        Err(err) => return ctx.fail("analyze", &err, assets.len(), 0),
    };
    write_blueprint(&ctx.out_dir, &blueprint)?;
    ctx.events.emit(
        "blueprint_created",
        json_object(json!({
            "analysis_summary": blueprint.analysis_summary,
            "cleaned_count": cleaned_count(&blueprint),
        })),
    )?;
    println!("{}", blueprint.analysis_summary);

    if !render_after {
        println!(
            "Blueprint written to {}",
            ctx.out_dir.join("blueprint.md").display()
        );
        ctx.finish(&pipeline, &blueprint, &[])?;
        return Ok(0);
    }
    render_and_finish(&ctx, &pipeline, &blueprint)
}

fn run_render(args: RenderArgs) -> Result<i32> {
    let ctx = RunContext::open(&args.run_dir)?;
    let pipeline = build_pipeline(&args.models)?;
    let mut blueprint = read_blueprint(&args.blueprint)?;
    if let Some(text_path) = args.text.as_ref() {
        let text = fs::read_to_string(text_path)
            .with_context(|| format!("failed reading {}", text_path.display()))?;
        blueprint = blueprint.with_text(text);
        ctx.events.emit(
            "blueprint_edited",
            json_object(json!({ "source": text_path.to_string_lossy() })),
        )?;
    }
    render_and_finish(&ctx, &pipeline, &blueprint)
}

fn render_and_finish(ctx: &RunContext, pipeline: &Pipeline, blueprint: &Blueprint) -> Result<i32> {
    let views = match pipeline.render_views(blueprint, &ctx.progress("render")) {
        Ok(views) => views,
        Err(err) => {
            return ctx.fail(
                "render",
                &err,
                blueprint.original_assets.len(),
                cleaned_count(blueprint),
            )
        }
    };
    let records = write_views(&ctx.out_dir, &views)?;
    for record in &records {
        println!("{}: {} ({})", record.label, record.file, record.source);
    }
    ctx.finish(pipeline, blueprint, &views)?;
    Ok(0)
}

/// Encodes every file into the upload library, in argument order; non-media
/// files are skipped with a warning.
fn load_media(paths: &[PathBuf]) -> Result<MediaLibrary> {
    let mut library = MediaLibrary::new();
    for path in paths {
        let raw = RawMedia::from_path(path)?;
        match codec::encode(&raw) {
            Ok(asset) => library.add(asset),
            Err(err @ (MediaError::Unsupported { .. } | MediaError::UnknownType { .. })) => {
                warn!("skipping {}: {err}", path.display());
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(library)
}

fn location_from_args(
    location: Option<&str>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Option<LocationSpec> {
    if let (Some(latitude), Some(longitude)) = (lat, lon) {
        return Some(LocationSpec::coordinates(latitude, longitude));
    }
    location
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(LocationSpec::address)
}

fn cleaned_count(blueprint: &Blueprint) -> usize {
    blueprint
        .cleaned_assets
        .iter()
        .filter(|asset| asset.name.starts_with(CLEANED_NAME_PREFIX))
        .count()
}

fn write_blueprint(out_dir: &Path, blueprint: &Blueprint) -> Result<()> {
    write_json_value(&out_dir.join("blueprint.json"), &serde_json::to_value(blueprint)?)?;
    let text_path = out_dir.join("blueprint.md");
    fs::write(&text_path, &blueprint.text)
        .with_context(|| format!("failed to write {}", text_path.display()))?;
    Ok(())
}

fn read_blueprint(path: &Path) -> Result<Blueprint> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid blueprint in {}", path.display()))
}

#[derive(Debug, Serialize)]
struct ViewRecord {
    label: String,
    description: String,
    source: &'static str,
    file: String,
}

fn write_views(out_dir: &Path, views: &[RenderedView]) -> Result<Vec<ViewRecord>> {
    let mut records = Vec::with_capacity(views.len());
    for view in views {
        let (mime_type, bytes) = codec::decode_data_uri(&view.image_data)
            .with_context(|| format!("{} has an invalid image payload", view.label))?;
        let file = format!(
            "{}.{}",
            slugify(&view.label),
            codec::extension_for_mime(&mime_type)
        );
        let path = out_dir.join(&file);
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        records.push(ViewRecord {
            label: view.label.clone(),
            description: view.description.clone(),
            source: if view.is_fallback() {
                "placeholder"
            } else {
                "generated"
            },
            file,
        });
    }
    write_json_value(&out_dir.join("views.json"), &serde_json::to_value(&records)?)?;
    Ok(records)
}

fn slugify(label: &str) -> String {
    label
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<String>>()
        .join("-")
}

fn write_json_value(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn json_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
