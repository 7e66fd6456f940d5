//! Render Pipeline - Single Entry Point
//!
//! CRITICAL: render_post MUST call validate_request internally. No bypass.

use std::io::Cursor;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::blocks::ContentBlock;
use crate::compose::Composer;
use crate::extract::{FieldExtractor, MarkerExtractor};
use crate::hashing::{compute_job_hash, compute_manifest_hash, image_digest, sha256_hex};
use crate::logo::{LogoSource, PlaceholderLogoSource};
use crate::templates::{Template, TemplateRegistry};
use crate::validation::{PostInput, ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Template version {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub template_id: String,
    pub company: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPost {
    pub id: String,
    pub template_id: String,
    pub template_version: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub manifest_hash: String,
    pub job_hash: String,
    pub image_hash: String,
    pub extractor: String,
    pub title: String,
    pub blocks: Vec<ContentBlock>,
    pub validation: ValidationResult,
    pub export: ExportedFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedFile {
    pub filename: String,
    pub format: String,
    pub size: [u32; 2],
    pub data_base64: String,
    pub hash: String,
}

impl ExportedFile {
    pub fn bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.data_base64)
    }
}

/// Download name used for a company's post image.
pub fn export_filename(company: &str) -> String {
    format!("{}_JobPost.png", company.trim().replace(' ', "_"))
}

/// Encode a composed canvas as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone()).write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// The render pipeline - single entry point for producing post images
pub struct RenderPipeline {
    registry: TemplateRegistry,
    validator: Validator,
    composer: Composer,
    logo_source: Box<dyn LogoSource>,
    extractor: Box<dyn FieldExtractor>,
}

impl RenderPipeline {
    pub fn new(registry: TemplateRegistry, composer: Composer) -> Self {
        Self {
            registry,
            validator: Validator::new(),
            composer,
            logo_source: Box::new(PlaceholderLogoSource),
            extractor: Box::new(MarkerExtractor),
        }
    }

    pub fn with_logo_source(mut self, source: Box<dyn LogoSource>) -> Self {
        self.logo_source = source;
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn FieldExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// List all available templates
    pub fn list_templates(&self) -> Vec<&Template> {
        self.registry.list()
    }

    /// Get a specific template
    pub fn get_template(&self, id: &str) -> Option<&Template> {
        self.registry.get(id)
    }

    /// Validate a post against a template
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_request(
        &self,
        template_id: &str,
        input: &PostInput,
    ) -> Result<ValidationResult, PipelineError> {
        let template = self.template(template_id)?;
        self.check_engine_version(template)?;
        Ok(self.validator.validate(input, template))
    }

    /// Extract, validate, compose and encode a post.
    ///
    /// CRITICAL: This ALWAYS calls validate_request internally. No bypass possible.
    pub fn render_post(&self, request: &RenderRequest) -> Result<RenderedPost, PipelineError> {
        let template = self.template(&request.template_id)?;

        let fields = self.extractor.extract(&request.details);
        let title = resolve_title(request, fields.title.as_deref());
        debug!(
            extractor = self.extractor.name(),
            blocks = fields.blocks.len(),
            %title,
            "extracted fields"
        );

        // MANDATORY: Validation is always called. This is non-negotiable.
        let input = PostInput::for_template(template, &title, fields.blocks.len());
        let validation = self.validate_request(&request.template_id, &input)?;

        if !validation.valid {
            let messages: Vec<_> = validation.violations.iter()
                .map(|v| format!("{}: {}", v.rule, v.message))
                .collect();
            return Err(PipelineError::ValidationFailed(messages.join("; ")));
        }

        let logo = self.logo_source.fetch(&request.company);
        let canvas = self.composer.compose(
            &logo,
            &title,
            &fields.blocks,
            template.width(),
            template.height(),
        );
        let image_hash = image_digest(&canvas);
        let png = encode_png(&canvas)?;

        let export = ExportedFile {
            filename: export_filename(&request.company),
            format: "png".to_string(),
            size: template.canvas_size,
            hash: sha256_hex(&png),
            data_base64: base64::engine::general_purpose::STANDARD.encode(&png),
        };

        let job_hash = compute_job_hash(
            &request.template_id,
            &template.template_version,
            request,
            ENGINE_VERSION,
        )?;

        let mut post = RenderedPost {
            id: Uuid::new_v4().to_string(),
            template_id: request.template_id.clone(),
            template_version: template.template_version.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            manifest_hash: String::new(),  // Computed after
            job_hash,
            image_hash,
            extractor: self.extractor.name().to_string(),
            title,
            blocks: fields.blocks,
            validation,
            export,
        };

        post.manifest_hash = compute_manifest_hash(&post)?;
        info!(
            template = %post.template_id,
            bytes = png.len(),
            image_hash = %post.image_hash,
            "rendered post"
        );

        Ok(post)
    }

    fn template(&self, id: &str) -> Result<&Template, PipelineError> {
        self.registry.get(id)
            .ok_or_else(|| PipelineError::TemplateNotFound(id.to_string()))
    }

    fn check_engine_version(&self, template: &Template) -> Result<(), PipelineError> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| PipelineError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let min_ver = semver::Version::parse(&template.engine_min_version)
            .map_err(|_| PipelineError::InvalidVersion(template.engine_min_version.clone()))?;

        if engine_ver < min_ver {
            return Err(PipelineError::EngineVersionMismatch(
                template.template_version.clone(),
                template.engine_min_version.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }

        Ok(())
    }
}

/// Explicit title, then the extractor's proposal, then the company name.
fn resolve_title(request: &RenderRequest, extracted: Option<&str>) -> String {
    request.title.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or(extracted)
        .unwrap_or(request.company.trim())
        .to_string()
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(TemplateRegistry::default(), Composer::default())
    }
}
