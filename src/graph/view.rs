// src/graph/view.rs
//! Projection of the graph into a `{nodes, links}` view for external
//! consumers (force-graph-style renderers, JSON output).

use super::{Graph, NodeLinks};
use crate::types::NotionId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Display weight attached to every projected node.
const NODE_DISPLAY_WEIGHT: u32 = 10;

/// Whether repeated mentions of one target become repeated edges.
///
/// Extraction always preserves multiplicity; this choice is applied
/// only when projecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMultiplicity {
    /// One edge per mention — the lossless default.
    #[default]
    PerMention,
    /// One edge per distinct (source, target) pair.
    Distinct,
}

/// A projected node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub id: NotionId,
    pub name: String,
    pub val: u32,
}

/// A projected directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewLink {
    pub source: NotionId,
    pub target: NotionId,
}

/// The `{nodes, links}` shape consumed by graph renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<ViewNode>,
    pub links: Vec<ViewLink>,
}

impl GraphView {
    /// Projects a graph into view form.
    ///
    /// Every node contributes: its parent edge (when the parent has an
    /// id), then for pages its child-page, linked-page, and
    /// linked-database edges, and for databases its member-page edges.
    /// Edge targets may be dangling — the renderer decides what to do
    /// with edges into inaccessible territory.
    pub fn project(graph: &Graph, multiplicity: EdgeMultiplicity) -> Self {
        let mut view = GraphView {
            nodes: Vec::with_capacity(graph.len()),
            links: Vec::new(),
        };
        let mut seen = HashSet::new();

        for (id, node) in graph.iter() {
            view.nodes.push(ViewNode {
                id: id.clone(),
                name: node.title.clone(),
                val: NODE_DISPLAY_WEIGHT,
            });

            let mut emit = |source: &NotionId, target: &NotionId| {
                let link = ViewLink {
                    source: source.clone(),
                    target: target.clone(),
                };
                if multiplicity == EdgeMultiplicity::Distinct && !seen.insert(link.clone()) {
                    return;
                }
                view.links.push(link);
            };

            if let Some(parent_id) = node.links.parent().id() {
                emit(id, parent_id);
            }

            match &node.links {
                NodeLinks::Page(links) => {
                    for target in &links.child_pages {
                        emit(id, target);
                    }
                    for target in &links.linked_pages {
                        emit(id, target);
                    }
                    for target in &links.linked_databases {
                        emit(id, target);
                    }
                }
                NodeLinks::Database(links) => {
                    for target in &links.pages {
                        emit(id, target);
                    }
                }
            }
        }

        view
    }
}
