// src/graph/links.rs
//! Link extraction: from a flat block sequence to the typed set of
//! outbound references it contains.

use super::LinkSet;
use crate::model::Block;
use crate::types::MentionKind;

/// Extracts every outbound reference from a page's blocks.
///
/// Pure: no I/O, input untouched, deterministic. `child_page` blocks
/// contribute their own id (the nested page), and every mention span in
/// rich text is classified by its target kind. Repeated mentions are
/// kept as-is; the caller owns multiplicity policy. The returned
/// `parent` is the workspace default — resolving the real parent is the
/// caller's job, since blocks don't know it.
pub fn extract_links(blocks: &[Block]) -> LinkSet {
    let mut links = LinkSet::default();

    for block in blocks {
        if block.is_child_page() {
            links.child_pages.push(block.id.clone());
        }

        for span in &block.rich_text {
            let Some(mention) = span.as_mention() else {
                continue;
            };
            match mention {
                MentionKind::Page { id } => links.linked_pages.push(id.clone()),
                MentionKind::Database { id } => links.linked_databases.push(id.clone()),
                MentionKind::User { id } => links.linked_users.push(id.clone()),
                // Date and link-preview mentions carry no workspace target
                MentionKind::Date | MentionKind::Other => {}
            }
        }
    }

    links
}
