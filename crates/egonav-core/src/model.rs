//! Node, edge and point records shared by every engine component.
//!
//! Records are created once when a dataset is indexed and never mutated
//! afterwards. Positions are deliberately absent from [`Node`]: they belong to
//! the external layout process and are read through
//! [`crate::layout::LayoutSource`].

use serde::Serialize;

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An entity in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    /// Display name; falls back to the id when the dataset has none.
    pub name: String,
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    /// Number of incident edges, parallel edges counted individually.
    pub degree: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_documents: Vec<String>,
}

impl Node {
    /// Case-insensitive substring match against the name and every alias.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .aliases
                .iter()
                .any(|alias| alias.to_lowercase().contains(needle))
    }
}

/// A directed, typed, evidenced relation.
///
/// Direction is semantic: `source GOVERNS target` is not the same fact as
/// `target GOVERNS source`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation_type: String,
    /// Extraction confidence in `[0, 1]`; `None` hides it from display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Number of textual mentions backing the edge (at least 1).
    pub support_count: u32,
    /// Number of distinct source documents backing the edge.
    pub support_doc_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl Edge {
    /// The endpoint opposite to `node_id`, or `None` if the edge does not touch it.
    #[must_use]
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.source == node_id {
            Some(&self.target)
        } else if self.target == node_id {
            Some(&self.source)
        } else {
            None
        }
    }

    /// True when the edge joins `a` and `b` in either direction.
    #[must_use]
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}
