//! Field Extraction Strategies
//!
//! Turns free-form posting text into an ordered block list (and optionally a
//! title). The composer only depends on the output shape, so strategies are
//! interchangeable behind `FieldExtractor`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::blocks::ContentBlock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(default)]
    pub title: Option<String>,
    pub blocks: Vec<ContentBlock>,
}

pub trait FieldExtractor: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, text: &str) -> ExtractedFields;
}

/// `**line**` is a heading, every other line is body.
fn marked_heading(line: &str) -> Option<&str> {
    if line.starts_with("**") && line.ends_with("**") {
        Some(line.trim_matches('*').trim())
    } else {
        None
    }
}

/// One block per input line; `**...**` lines become headings.
///
/// Blank lines inside the text are kept as empty body blocks, so they still
/// take up a line of vertical space.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerExtractor;

impl FieldExtractor for MarkerExtractor {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn extract(&self, text: &str) -> ExtractedFields {
        let blocks = text
            .trim()
            .split('\n')
            .map(str::trim)
            .map(|line| match marked_heading(line) {
                Some(heading) => ContentBlock::heading(heading),
                None => ContentBlock::body(line),
            })
            .collect();

        ExtractedFields { title: None, blocks }
    }
}

const KNOWN_LABELS: &str = r"age\s*limit|maximum\s+age|vacanc(?:y|ies)|no\.?\s+of\s+posts|eligibility|qualification|salary|pay\s*scale|stipend|last\s+date(?:\s+for\s+submission\s+of\s+application)?|location|job\s+details|how\s+to\s+apply";

/// Regex strategy for postings written as `Label: value` lines.
pub struct LabeledFieldExtractor {
    inline_field: Regex,
    bare_label: Regex,
    title_line: Regex,
}

impl LabeledFieldExtractor {
    pub fn new() -> Self {
        Self {
            inline_field: Regex::new(&format!(r"(?i)^({KNOWN_LABELS})\s*[:\-–]\s*(.+)$"))
                .expect("inline field pattern"),
            bare_label: Regex::new(&format!(r"(?i)^({KNOWN_LABELS})\s*:?$"))
                .expect("bare label pattern"),
            title_line: Regex::new(r"(?i)\b(?:recruitment|notification)\s+(?:19|20)\d{2}\b")
                .expect("title pattern"),
        }
    }
}

impl Default for LabeledFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LabeledFieldExtractor {
    fn name(&self) -> &'static str {
        "labeled"
    }

    fn extract(&self, text: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::default();

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let plain = marked_heading(line).unwrap_or(line);

            if fields.title.is_none() && self.title_line.is_match(plain) {
                fields.title = Some(plain.to_string());
            }

            if let Some(heading) = marked_heading(line) {
                fields.blocks.push(ContentBlock::heading(heading));
            } else if let Some(caps) = self.inline_field.captures(line) {
                fields.blocks.push(ContentBlock::heading(caps[1].trim()));
                fields.blocks.push(ContentBlock::body(caps[2].trim()));
            } else if self.bare_label.is_match(line) {
                fields.blocks.push(ContentBlock::heading(line.trim_end_matches(':').trim()));
            } else {
                fields.blocks.push(ContentBlock::body(line));
            }
        }

        fields
    }
}
