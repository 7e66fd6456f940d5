//! JobPost Core - Job Post Image Composer
//!
//! # Layers
//! 1. Pure core: `wrap` (line wrapper) and `compose` (image composer)
//! 2. Collaborators: `logo` (fetch or placeholder), `extract` (text to blocks)
//! 3. Shell: `templates`, `validation`, `hashing`, `pipeline`, `config`

pub mod blocks;
pub mod font;
pub mod raster;
pub mod wrap;
pub mod compose;
pub mod logo;
pub mod extract;
pub mod templates;
pub mod validation;
pub mod hashing;
pub mod pipeline;
pub mod config;

pub use blocks::{BlockTag, ContentBlock};
pub use font::{Font, TextMetrics, Typeface, Weight};
pub use wrap::{draw_wrapped, wrap_text};
pub use compose::{compose, Composer, StyleSpec, Theme, Typefaces};
pub use logo::{placeholder_logo, HttpLogoSource, LogoSource, PlaceholderLogoSource};
pub use extract::{ExtractedFields, FieldExtractor, LabeledFieldExtractor, MarkerExtractor};
pub use templates::{Template, TemplateId, TemplateRegistry, Platform};
pub use validation::{PostInput, ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};
pub use hashing::{compute_manifest_hash, compute_job_hash, canonical_json, image_digest};
pub use pipeline::{RenderPipeline, RenderedPost, RenderRequest, PipelineError};
pub use config::Config;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_TEMPLATE_ENGINE_VERSION: &str = "1.0.0";
