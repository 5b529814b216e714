// src/model/block.rs
//! One node of a page's content tree.
//!
//! The crawler cares about three things per block: whether it marks a
//! nested page, whether it has children worth draining, and which
//! mentions its rich text carries. Everything else the API sends is
//! dropped at the parser boundary.

use crate::types::{NotionId, RichTextItem};
use serde::{Deserialize, Serialize};

/// The block type vocabulary.
///
/// `ChildPage` is special throughout the crawl: its children belong to
/// the nested page, never to the containing page's subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Paragraph,
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
    BulletedListItem,
    NumberedListItem,
    ToDo,
    Toggle,
    Quote,
    Callout,
    Code,
    ChildPage,
    ChildDatabase,
    Divider,
    Bookmark,
    Embed,
    Image,
    Table,
    TableRow,
    ColumnList,
    Column,
    SyncedBlock,
    LinkToPage,
    #[serde(other)]
    Unsupported,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading_1",
            BlockType::Heading2 => "heading_2",
            BlockType::Heading3 => "heading_3",
            BlockType::BulletedListItem => "bulleted_list_item",
            BlockType::NumberedListItem => "numbered_list_item",
            BlockType::ToDo => "to_do",
            BlockType::Toggle => "toggle",
            BlockType::Quote => "quote",
            BlockType::Callout => "callout",
            BlockType::Code => "code",
            BlockType::ChildPage => "child_page",
            BlockType::ChildDatabase => "child_database",
            BlockType::Divider => "divider",
            BlockType::Bookmark => "bookmark",
            BlockType::Embed => "embed",
            BlockType::Image => "image",
            BlockType::Table => "table",
            BlockType::TableRow => "table_row",
            BlockType::ColumnList => "column_list",
            BlockType::Column => "column",
            BlockType::SyncedBlock => "synced_block",
            BlockType::LinkToPage => "link_to_page",
            BlockType::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A content block, flattened to what the crawl needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: NotionId,
    pub block_type: BlockType,
    pub has_children: bool,
    /// Rich text spans for content-bearing block kinds; empty otherwise.
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
}

impl Block {
    /// Whether this block marks a nested page.
    pub fn is_child_page(&self) -> bool {
        self.block_type == BlockType::ChildPage
    }

    /// Whether the subtree drain should descend into this block.
    ///
    /// A `child_page` block's children belong to the nested page, not
    /// to the page being drained.
    pub fn descend_into_children(&self) -> bool {
        self.has_children && !self.is_child_page()
    }
}
