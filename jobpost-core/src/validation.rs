//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy maps violations to actions.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::templates::{Template, FailureMode};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub template_id: String,
    pub template_version: String,
}

impl ValidationResult {
    pub fn success(template: &Template) -> Self {
        Self {
            valid: true,
            violations: vec![],
            template_id: template.id.clone(),
            template_version: template.template_version.clone(),
        }
    }

    pub fn failure(template: &Template, violations: Vec<ValidationViolation>) -> Self {
        Self {
            valid: false,
            violations,
            template_id: template.id.clone(),
            template_version: template.template_version.clone(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, input: &PostInput, template: &Template) -> Vec<ValidationViolation>;
}

/// What a render is about to draw
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostInput {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub block_count: usize,
}

impl PostInput {
    pub fn for_template(template: &Template, title: &str, block_count: usize) -> Self {
        Self {
            width: template.width(),
            height: template.height(),
            title: title.to_string(),
            block_count,
        }
    }
}

// --- Concrete Rules ---

pub struct CanvasSizeRule;

impl ValidationRule for CanvasSizeRule {
    fn name(&self) -> &'static str { "canvas_size" }

    fn validate(&self, input: &PostInput, template: &Template) -> Vec<ValidationViolation> {
        let rule = &template.validation.rules.canvas;
        if !rule.enabled {
            return vec![];
        }

        if input.width == 0 || input.height == 0 {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Canvas must have positive dimensions".to_string(),
                expected: Some("width > 0 and height > 0".to_string()),
                actual: Some(format!("{}x{}", input.width, input.height)),
                remediation: vec!["Fix the template canvasSize".to_string()],
            }];
        }

        if input.width > rule.max_width || input.height > rule.max_height {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Canvas too large".to_string(),
                expected: Some(format!("{}x{} maximum", rule.max_width, rule.max_height)),
                actual: Some(format!("{}x{}", input.width, input.height)),
                remediation: vec!["Pick a smaller template".to_string()],
            }];
        }

        vec![]
    }
}

pub struct TitleRule;

impl ValidationRule for TitleRule {
    fn name(&self) -> &'static str { "title" }

    fn validate(&self, input: &PostInput, template: &Template) -> Vec<ValidationViolation> {
        let rule = &template.validation.rules.title;
        if !rule.enabled {
            return vec![];
        }

        let chars = input.title.trim().chars().count();
        if chars == 0 {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Title is empty".to_string(),
                expected: Some("non-empty title".to_string()),
                actual: None,
                remediation: vec!["Provide --title or a company name".to_string()],
            }];
        }

        if chars > rule.max_chars {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: "Title is not wrapped and may run off the canvas".to_string(),
                expected: Some(format!("{} characters max", rule.max_chars)),
                actual: Some(format!("{} characters", chars)),
                remediation: vec!["Shorten the title".to_string()],
            }];
        }

        vec![]
    }
}

pub struct ContentRule;

impl ValidationRule for ContentRule {
    fn name(&self) -> &'static str { "content" }

    fn validate(&self, input: &PostInput, template: &Template) -> Vec<ValidationViolation> {
        let rule = &template.validation.rules.content;
        if !rule.enabled {
            return vec![];
        }

        if input.block_count == 0 {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: "No content blocks; only logo, title and footer will render".to_string(),
                expected: Some("at least one block".to_string()),
                actual: Some("0 blocks".to_string()),
                remediation: vec!["Add job details".to_string()],
            }];
        }

        if input.block_count > rule.max_blocks {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: "Content likely overflows the canvas".to_string(),
                expected: Some(format!("{} blocks max", rule.max_blocks)),
                actual: Some(format!("{} blocks", input.block_count)),
                remediation: vec!["Trim the job details or use a taller template".to_string()],
            }];
        }

        vec![]
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CanvasSizeRule),
                Box::new(TitleRule),
                Box::new(ContentRule),
            ],
        }
    }

    pub fn validate(&self, input: &PostInput, template: &Template) -> ValidationResult {
        let mut all_violations = vec![];

        for rule in &self.rules {
            all_violations.extend(rule.validate(input, template));
        }

        let has_errors = all_violations.iter()
            .any(|v| v.severity == ViolationSeverity::Error);

        match template.validation.failure_mode {
            FailureMode::Block if has_errors => {
                ValidationResult::failure(template, all_violations)
            }
            FailureMode::Block | FailureMode::Warn => {
                // Never block, just record
                ValidationResult {
                    valid: true,
                    violations: all_violations,
                    template_id: template.id.clone(),
                    template_version: template.template_version.clone(),
                }
            }
            FailureMode::Log => {
                // Violations go to the log only; the result stays clean
                for v in &all_violations {
                    match v.severity {
                        ViolationSeverity::Error => {
                            warn!(template = %template.id, rule = %v.rule, "{}", v.message)
                        }
                        ViolationSeverity::Warning | ViolationSeverity::Info => {
                            info!(template = %template.id, rule = %v.rule, "{}", v.message)
                        }
                    }
                }
                ValidationResult::success(template)
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateRegistry;

    fn template() -> Template {
        TemplateRegistry::with_builtins().get("instagram-post").unwrap().clone()
    }

    #[test]
    fn test_valid_post_has_no_violations() {
        let t = template();
        let result = Validator::new().validate(&PostInput::for_template(&t, "Indian Army 2025", 5), &t);
        assert!(result.valid);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_empty_title_blocks() {
        let t = template();
        let result = Validator::new().validate(&PostInput::for_template(&t, "  ", 3), &t);
        assert!(!result.valid);
        assert!(result.has_errors());
        assert_eq!(result.violations[0].rule, "title");
    }

    #[test]
    fn test_no_blocks_is_only_a_warning() {
        let t = template();
        let result = Validator::new().validate(&PostInput::for_template(&t, "Title", 0), &t);
        assert!(result.valid);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, ViolationSeverity::Warning);
    }

    #[test]
    fn test_warn_mode_never_blocks() {
        let mut t = template();
        t.canvas_size = [0, 1080];
        t.validation.failure_mode = FailureMode::Warn;
        let result = Validator::new().validate(&PostInput::for_template(&t, "Title", 1), &t);
        assert!(result.valid);
        assert!(result.has_errors());
    }

    #[test]
    fn test_log_mode_reports_nothing() {
        let mut t = template();
        t.canvas_size = [0, 1080];
        t.validation.failure_mode = FailureMode::Log;
        let result = Validator::new().validate(&PostInput::for_template(&t, "", 0), &t);
        assert!(result.valid);
        assert!(result.violations.is_empty());
        assert!(!result.has_errors());
        assert_eq!(result.template_id, "instagram-post");
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let mut t = template();
        t.canvas_size = [10_000, 1080];
        let result = Validator::new().validate(&PostInput::for_template(&t, "Title", 1), &t);
        assert!(!result.valid);
        assert_eq!(result.violations[0].rule, "canvas_size");
    }
}
