//! Canvas Templates - Named Size Presets

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

pub type TemplateId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub template_version: String,
    pub engine_min_version: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub superseded_by: Option<String>,
    #[serde(default)]
    pub platform: Platform,
    pub canvas_size: [u32; 2],
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Template {
    pub fn width(&self) -> u32 {
        self.canvas_size[0]
    }

    pub fn height(&self) -> u32 {
        self.canvas_size[1]
    }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Linkedin,
    Twitter,
    #[default]
    Custom,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    #[serde(default)]
    pub failure_mode: FailureMode,
    #[serde(default)]
    pub rules: ValidationRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Error-severity violations stop the render.
    #[default]
    Block,
    /// Render anyway; violations are returned with the result.
    Warn,
    /// Render anyway; violations are only written to the log.
    Log,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default)]
    pub canvas: CanvasRule,
    #[serde(default)]
    pub title: TitleRule,
    #[serde(default)]
    pub content: ContentRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasRule {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_side")]
    pub max_width: u32,
    #[serde(default = "default_max_side")]
    pub max_height: u32,
}

fn default_max_side() -> u32 { 8192 }

impl Default for CanvasRule {
    fn default() -> Self {
        Self { enabled: true, max_width: default_max_side(), max_height: default_max_side() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleRule {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_title_chars")]
    pub max_chars: usize,
}

fn default_max_title_chars() -> usize { 80 }

impl Default for TitleRule {
    fn default() -> Self {
        Self { enabled: true, max_chars: default_max_title_chars() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRule {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_blocks")]
    pub max_blocks: usize,
}

fn default_max_blocks() -> usize { 40 }

impl Default for ContentRule {
    fn default() -> Self {
        Self { enabled: true, max_blocks: default_max_blocks() }
    }
}

fn builtin(id: &str, name: &str, platform: Platform, size: [u32; 2]) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} ({}x{})", name, size[0], size[1]),
        template_version: "1.0.0".to_string(),
        engine_min_version: crate::MIN_TEMPLATE_ENGINE_VERSION.to_string(),
        deprecated: false,
        superseded_by: None,
        platform,
        canvas_size: size,
        validation: ValidationConfig::default(),
    }
}

/// Template registry - built-in presets plus optional JSON overrides
pub struct TemplateRegistry {
    templates: HashMap<TemplateId, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self { templates: HashMap::new() }
    }

    /// The four social-media presets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(builtin("instagram-post", "Instagram Post", Platform::Instagram, [1080, 1080]));
        registry.register(builtin("instagram-story", "Instagram Story", Platform::Instagram, [1080, 1920]));
        registry.register(builtin("linkedin-post", "LinkedIn Post", Platform::Linkedin, [1200, 627]));
        registry.register(builtin("twitter-post", "Twitter Post", Platform::Twitter, [1024, 512]));
        registry
    }

    /// Built-ins overlaid with every parseable `*.json` template in `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, std::io::Error> {
        let mut registry = Self::with_builtins();
        if dir.exists() {
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().map_or(false, |e| e == "json") {
                    let parsed = fs::read_to_string(&path)
                        .map_err(|e| e.to_string())
                        .and_then(|content| {
                            serde_json::from_str::<Template>(&content).map_err(|e| e.to_string())
                        });
                    match parsed {
                        Ok(template) => registry.register(template),
                        Err(e) => warn!(path = %path.display(), "skipping template: {e}"),
                    }
                }
            }
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    /// Templates sorted by id.
    pub fn list(&self) -> Vec<&Template> {
        let mut templates: Vec<_> = self.templates.values().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        templates
    }

    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.id.clone(), template);
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
