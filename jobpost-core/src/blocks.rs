//! Content Blocks - Ordered Text Units

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    Heading,
    Body,
}

/// One labeled unit of text, rendered in sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub tag: BlockTag,
    pub text: String,
}

impl ContentBlock {
    pub fn heading(text: impl Into<String>) -> Self {
        Self { tag: BlockTag::Heading, text: text.into() }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self { tag: BlockTag::Body, text: text.into() }
    }
}
