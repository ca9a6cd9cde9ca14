//! Dataset loading.
//!
//! # Overview
//!
//! The exploration engine consumes one static graph export produced by the
//! upstream pipeline. The export is a JSON object:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "person:ada", "name": "Ada", "entity_type": "PERSON",
//!               "community": "Community 1", "x": 12.0, "y": -40.5 }],
//!   "links": [{ "source": "person:ada", "target": "org:engine",
//!               "relation_type": "WORKS_FOR", "confidence": 0.9,
//!               "support_count": 2, "support_doc_count": 1,
//!               "evidence": "Ada worked on the engine." }],
//!   "community_colors": { "Community 1": "#FF6B6B" },
//!   "min_degree": 2
//! }
//! ```
//!
//! `edges` is accepted in place of `links`. Every field other than node `id`
//! and edge `source`/`target` is optional. Records are kept as decoded; the
//! [`crate::index::GraphIndex`] normalizes them into [`crate::model`] types.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{info, instrument};

use crate::error::DatasetError;
use crate::model::Point;

/// A decoded graph export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default, alias = "edges")]
    pub links: Vec<EdgeRecord>,
    /// Community tag → display color (`#RRGGBB`).
    #[serde(default)]
    pub community_colors: BTreeMap<String, String>,
    /// Default minimum-degree threshold for the overview filter.
    #[serde(default)]
    pub min_degree: Option<usize>,
}

/// One node as it appears in the export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default, alias = "node_degree")]
    pub degree: Option<usize>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub source_documents: Vec<String>,
    /// Free-form attributes; `aliases` / `also_known_as` are read from here too.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl NodeRecord {
    /// Aliases from the top-level field and from `attributes`, deduplicated,
    /// in first-seen order.
    #[must_use]
    pub fn all_aliases(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let from_attrs = ["aliases", "also_known_as"]
            .iter()
            .filter_map(|key| self.attributes.get(*key))
            .flat_map(|value| match value {
                serde_json::Value::String(s) => vec![s.clone()],
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            });
        for alias in self.aliases.iter().cloned().chain(from_attrs) {
            if !alias.is_empty() && !out.contains(&alias) {
                out.push(alias);
            }
        }
        out
    }

    /// Community tag with empty strings treated as "no community".
    #[must_use]
    pub fn community_tag(&self) -> Option<&str> {
        self.community.as_deref().filter(|c| !c.is_empty())
    }
}

/// One edge as it appears in the export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub relation_type: Option<String>,
    #[serde(default)]
    pub relation_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub support_count: Option<u32>,
    #[serde(default)]
    pub support_doc_count: Option<u32>,
    #[serde(default)]
    pub evidence: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

impl Dataset {
    /// Decode a dataset from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Parse`] on malformed JSON and
    /// [`DatasetError::Empty`] when the export has no nodes.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let dataset: Self = serde_json::from_str(json)?;
        if dataset.nodes.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(dataset)
    }

    /// Read and decode a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Read`] if the file cannot be read, otherwise
    /// the errors of [`Dataset::from_json_str`].
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json_str(&content)?;
        info!(
            nodes = dataset.nodes.len(),
            links = dataset.links.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Coordinates shipped with the export, for nodes that have both `x` and `y`.
    #[must_use]
    pub fn positions(&self) -> HashMap<String, Point> {
        self.nodes
            .iter()
            .filter_map(|n| match (n.x, n.y) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                    Some((n.id.clone(), Point::new(x, y)))
                }
                _ => None,
            })
            .collect()
    }
}
