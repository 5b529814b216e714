mod block;

pub use block::{Block, BlockType};

use crate::types::{NotionId, PropertyName, RichTextItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which of the two crawlable resource kinds an id refers to.
///
/// Page and database ids share one namespace; the kind travels with the
/// id so the crawler knows which retrieve endpoint to use before the
/// resource itself has been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Page,
    Database,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Page => "page",
            ResourceKind::Database => "database",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A frontier entry: a resource known only by id and kind, queued for
/// fetching in the current BFS level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: NotionId,
    pub kind: ResourceKind,
}

impl ResourceRef {
    #[allow(dead_code)] // Used by lib consumers and test fixtures
    pub fn page(id: NotionId) -> Self {
        Self {
            id,
            kind: ResourceKind::Page,
        }
    }

    #[allow(dead_code)] // Used by lib consumers and test fixtures
    pub fn database(id: NotionId) -> Self {
        Self {
            id,
            kind: ResourceKind::Database,
        }
    }
}

/// Parent reference as declared by the API on a page or database.
///
/// `Block` parents occur when a page is nested under a block of another
/// page; the graph model has no block arm, so they resolve to the
/// workspace root (see `graph::Parent::from_declared`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParentRef {
    #[serde(rename = "page_id")]
    Page { page_id: NotionId },
    #[serde(rename = "database_id")]
    Database { database_id: NotionId },
    #[serde(rename = "block_id")]
    Block { block_id: NotionId },
    #[serde(rename = "workspace")]
    Workspace,
}

/// A property value, tagged by type.
///
/// The crawler only distinguishes title-typed properties (the source of
/// page titles) from everything else; the remaining vocabulary is kept
/// as its type name so the variant stays honest about what was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Title { fragments: Vec<RichTextItem> },
    Other { property_type: String },
}

impl PropertyValue {
    pub fn is_title(&self) -> bool {
        matches!(self, PropertyValue::Title { .. })
    }

    /// Title fragments, if this is a title-typed property.
    pub fn title_fragments(&self) -> Option<&[RichTextItem]> {
        match self {
            PropertyValue::Title { fragments } => Some(fragments),
            PropertyValue::Other { .. } => None,
        }
    }
}

/// A Notion page as fetched from the API, before its block subtree is
/// attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: NotionId,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    pub parent: ParentRef,
    pub properties: HashMap<PropertyName, PropertyValue>,
}

/// A Notion database as fetched from the API.
///
/// Member pages are not embedded; the crawler records their ids as
/// edges and fetches them as their own frontier entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: NotionId,
    pub title: Vec<RichTextItem>,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    pub parent: ParentRef,
}
