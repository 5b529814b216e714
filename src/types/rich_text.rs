// src/types/rich_text.rs
//! The typed rich-text vocabulary the link extractor classifies over.

use super::NotionId;
use serde::{Deserialize, Serialize};

/// The kind of rich text content — a typed vocabulary replacing
/// stringly-typed dispatch.
///
/// Each variant carries its specific data, making invalid states
/// unrepresentable: you can't have a "mention" span with no mention
/// target, or an "equation" span with no expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RichTextType {
    Text { content: String },
    Mention(MentionKind),
    Equation { expression: String },
}

/// What an inline mention points at.
///
/// Pages, databases, and users contribute edges to the graph; date and
/// link-preview mentions carry no workspace target and are skipped by
/// the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MentionKind {
    Page { id: NotionId },
    Database { id: NotionId },
    User { id: NotionId },
    Date,
    Other,
}

/// Rich text item.
///
/// The `text_type` field carries the content variant — text, mention, or
/// equation — and `plain_text` provides the fallback rendering for any
/// variant (it is what title fragments are assembled from).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextItem {
    pub text_type: RichTextType,
    pub plain_text: String,
}

impl RichTextItem {
    /// Create a plain text item — the most common rich text variant.
    #[allow(dead_code)] // Used by lib consumers and test fixtures
    pub fn plain_text(text: &str) -> Self {
        Self {
            text_type: RichTextType::Text {
                content: text.to_string(),
            },
            plain_text: text.to_string(),
        }
    }

    /// Create a mention span pointing at the given target.
    #[allow(dead_code)] // Used by lib consumers and test fixtures
    pub fn mention(kind: MentionKind) -> Self {
        Self {
            text_type: RichTextType::Mention(kind),
            plain_text: String::new(),
        }
    }

    /// The mention carried by this span, if it is one.
    pub fn as_mention(&self) -> Option<&MentionKind> {
        match &self.text_type {
            RichTextType::Mention(kind) => Some(kind),
            _ => None,
        }
    }
}
