//! JobPost CLI - Render job post images
//!
//! Commands: templates, validate, render, wrap
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation failure

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobpost_core::{
    extract::FieldExtractor,
    Composer, Config, HttpLogoSource, LabeledFieldExtractor, LogoSource, MarkerExtractor,
    PipelineError, PlaceholderLogoSource, PostInput, RenderPipeline, RenderRequest,
    TemplateRegistry, Typeface, Typefaces, Weight,
};

#[derive(Parser)]
#[command(name = "jobpost-cli")]
#[command(about = "JobPost CLI - Job post image composer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to templates directory (overrides JOBPOST_TEMPLATES_DIR)
    #[arg(short, long)]
    templates_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExtractorKind {
    /// `**heading**` lines, one block per line
    Marker,
    /// `Label: value` lines for common posting fields
    Labeled,
}

impl ExtractorKind {
    fn build(self) -> Box<dyn FieldExtractor> {
        match self {
            ExtractorKind::Marker => Box::new(MarkerExtractor),
            ExtractorKind::Labeled => Box::new(LabeledFieldExtractor::new()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List available templates
    Templates,

    /// Validate a post without rendering
    Validate {
        /// Template ID
        #[arg(short, long)]
        template: String,

        /// Title / headline
        #[arg(long)]
        title: String,

        /// Job details file, or - for stdin
        #[arg(short, long)]
        details: PathBuf,

        #[arg(long, value_enum, default_value = "marker")]
        extractor: ExtractorKind,
    },

    /// Render a post image
    Render {
        /// Template ID
        #[arg(short, long)]
        template: String,

        /// Organization / company name
        #[arg(short, long)]
        company: String,

        /// Title / headline (defaults to the extracted title or company)
        #[arg(long)]
        title: Option<String>,

        /// Job details file, or - for stdin
        #[arg(short, long)]
        details: PathBuf,

        /// Output PNG path (defaults to <Company>_JobPost.png)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Use the placeholder logo instead of fetching one
        #[arg(long)]
        offline: bool,

        #[arg(long, value_enum, default_value = "marker")]
        extractor: ExtractorKind,
    },

    /// Show how text wraps at a given size (regular face; embedded DejaVu Sans unless configured)
    Wrap {
        #[arg(long)]
        text: String,

        /// Font size in pixels (clamped to 1..=2048)
        #[arg(long, default_value_t = 38.0)]
        size: f32,

        /// Maximum line width in pixels
        #[arg(long, default_value_t = 918.0)]
        max_width: f32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!(r#"{{"error": "Invalid configuration: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("jobpost_core={0},jobpost_cli={0}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli, config) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            let output = serde_json::json!({ "success": false, "error": format!("{e:#}") });
            println!("{}", output);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: Config) -> Result<ExitCode> {
    let templates_dir = cli.templates_dir.or_else(|| config.templates_dir.clone());
    let registry = match &templates_dir {
        Some(dir) => TemplateRegistry::load_from_dir(dir)
            .with_context(|| format!("Failed to load templates from {}", dir.display()))?,
        None => TemplateRegistry::with_builtins(),
    };

    match cli.command {
        Commands::Templates => {
            let pipeline = RenderPipeline::new(registry, Composer::default());
            let templates: Vec<_> = pipeline.list_templates()
                .iter()
                .map(|t| serde_json::json!({
                    "id": t.id,
                    "name": t.name,
                    "version": t.template_version,
                    "platform": t.platform,
                    "size": t.canvas_size,
                    "deprecated": t.deprecated,
                }))
                .collect();

            println!("{}", serde_json::to_string_pretty(&templates)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate { template, title, details, extractor } => {
            let details = read_details(&details)?;
            let pipeline = RenderPipeline::new(registry, Composer::default());
            let tpl = pipeline.get_template(&template)
                .ok_or_else(|| PipelineError::TemplateNotFound(template.clone()))?;

            let fields = extractor.build().extract(&details);
            let input = PostInput::for_template(tpl, &title, fields.blocks.len());
            let result = pipeline.validate_request(&template, &input)?;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.valid {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(2))  // Validation failure
            }
        }

        Commands::Render { template, company, title, details, out, offline, extractor } => {
            let details = read_details(&details)?;
            let typefaces = Typefaces::discover(
                config.bold_font.as_deref(),
                config.regular_font.as_deref(),
            );
            info!(
                bold_embedded = typefaces.bold.is_embedded(),
                regular_embedded = typefaces.regular.is_embedded(),
                "typefaces resolved"
            );

            let logo_source: Box<dyn LogoSource> = if offline || config.offline {
                Box::new(PlaceholderLogoSource)
            } else {
                Box::new(HttpLogoSource::new(config.logo_endpoint.clone(), config.logo_timeout)?)
            };

            let pipeline = RenderPipeline::new(registry, Composer::new(typefaces))
                .with_logo_source(logo_source)
                .with_extractor(extractor.build());

            let request = RenderRequest { template_id: template, company, title, details };

            let post = match pipeline.render_post(&request) {
                Ok(post) => post,
                Err(e @ PipelineError::ValidationFailed(_)) => {
                    let output = serde_json::json!({ "success": false, "error": e.to_string() });
                    println!("{}", output);
                    return Ok(ExitCode::from(2));
                }
                Err(e) => return Err(e.into()),
            };

            let path = out.unwrap_or_else(|| PathBuf::from(&post.export.filename));
            let bytes = post.export.bytes().context("Failed to decode rendered image")?;
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            let output = serde_json::json!({
                "success": true,
                "path": path,
                "id": post.id,
                "template_id": post.template_id,
                "title": post.title,
                "blocks": post.blocks.len(),
                "size": post.export.size,
                "hash": post.export.hash,
                "image_hash": post.image_hash,
                "job_hash": post.job_hash,
                "manifest_hash": post.manifest_hash,
                "validation": post.validation,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Wrap { text, size, max_width } => {
            let face = Typeface::discover(config.regular_font.as_deref(), Weight::Regular);
            let font = face.at_size(size);
            let lines = jobpost_core::wrap_text(&text, &font, max_width);
            let output = serde_json::json!({
                "embedded": face.is_embedded(),
                "line_height": jobpost_core::TextMetrics::line_height(&font),
                "lines": lines,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_details(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("Failed to read details from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read details from {}", path.display()))
    }
}
