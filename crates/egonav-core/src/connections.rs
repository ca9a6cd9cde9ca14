//! Connection grouping for the detail panel.
//!
//! A node's incident edges are folded into one [`ConnectionGroup`] per
//! (direction, neighbor) pair. Parallel edges with different relation types
//! end up in the same group; each contributing edge is kept for drill-down.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::index::GraphIndex;
use crate::model::Edge;

/// Edge direction relative to the focal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The focal node is the edge's source.
    Outgoing,
    /// The focal node is the edge's target.
    Incoming,
}

impl Direction {
    /// Arrow glyph used in compact listings.
    #[must_use]
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Outgoing => "→",
            Self::Incoming => "←",
        }
    }
}

/// The evidence of one edge inside a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributingEdge {
    pub edge_id: String,
    pub relation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub support_count: u32,
    pub support_doc_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl From<&Edge> for ContributingEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            edge_id: edge.id.clone(),
            relation_type: edge.relation_type.clone(),
            confidence: edge.confidence,
            support_count: edge.support_count,
            support_doc_count: edge.support_doc_count,
            evidence: edge.evidence.clone(),
        }
    }
}

/// All edges between the focal node and one neighbor in one direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionGroup {
    pub direction: Direction,
    pub neighbor_id: String,
    pub neighbor_name: String,
    /// Deduplicated and sorted.
    pub relation_types: Vec<String>,
    /// In dataset order.
    pub edges: Vec<ContributingEdge>,
}

impl ConnectionGroup {
    /// Relation types joined with `", "`; the sort key within a direction.
    #[must_use]
    pub fn relation_key(&self) -> String {
        self.relation_types.join(", ")
    }

    #[must_use]
    pub fn has_relation(&self, relation_type: &str) -> bool {
        self.relation_types.iter().any(|r| r == relation_type)
    }

    /// Total textual mentions across contributing edges.
    #[must_use]
    pub fn support_count(&self) -> u32 {
        self.edges.iter().map(|e| e.support_count).sum()
    }
}

/// Group the edges touching `focal`.
///
/// Outgoing groups come first, then incoming. Within a direction groups are
/// ordered by their joined relation types, then by neighbor display name.
/// With `relation_filter`, only groups containing that relation type are
/// kept. An unknown `focal` yields an empty list.
#[must_use]
pub fn group_connections(
    index: &GraphIndex,
    focal: &str,
    relation_filter: Option<&str>,
) -> Vec<ConnectionGroup> {
    if !index.contains(focal) {
        return Vec::new();
    }

    let mut groups: Vec<ConnectionGroup> = Vec::new();
    let mut slot: HashMap<(Direction, String), usize> = HashMap::new();

    for edge in index.edges() {
        let (direction, neighbor) = if edge.source == focal {
            (Direction::Outgoing, edge.target.as_str())
        } else if edge.target == focal {
            (Direction::Incoming, edge.source.as_str())
        } else {
            continue;
        };

        let key = (direction, neighbor.to_string());
        let pos = if let Some(&pos) = slot.get(&key) {
            pos
        } else {
            let neighbor_name = index
                .node(neighbor)
                .map_or_else(|| neighbor.to_string(), |n| n.name.clone());
            groups.push(ConnectionGroup {
                direction,
                neighbor_id: neighbor.to_string(),
                neighbor_name,
                relation_types: Vec::new(),
                edges: Vec::new(),
            });
            slot.insert(key, groups.len() - 1);
            groups.len() - 1
        };

        let group = &mut groups[pos];
        if !group.relation_types.contains(&edge.relation_type) {
            group.relation_types.push(edge.relation_type.clone());
        }
        group.edges.push(ContributingEdge::from(edge));
    }

    for group in &mut groups {
        group.relation_types.sort();
    }

    if let Some(filter) = relation_filter {
        groups.retain(|g| g.has_relation(filter));
    }

    groups.sort_by(|a, b| {
        a.direction
            .cmp(&b.direction)
            .then_with(|| a.relation_key().cmp(&b.relation_key()))
            .then_with(|| a.neighbor_name.cmp(&b.neighbor_name))
    });
    groups
}

/// Relation type → number of contributing edges, for building a filter list.
#[must_use]
pub fn relation_type_counts(groups: &[ConnectionGroup]) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for edge in groups.iter().flat_map(|g| &g.edges) {
        *out.entry(edge.relation_type.clone()).or_insert(0) += 1;
    }
    out
}

/// Index of the first group whose neighbor is `neighbor_id`.
#[must_use]
pub fn position_of_neighbor(groups: &[ConnectionGroup], neighbor_id: &str) -> Option<usize> {
    groups.iter().position(|g| g.neighbor_id == neighbor_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, EdgeRecord, NodeRecord};

    fn index(nodes: &[(&str, &str)], links: &[(&str, &str, &str)]) -> GraphIndex {
        let ds = Dataset {
            nodes: nodes
                .iter()
                .map(|(id, name)| NodeRecord {
                    id: (*id).to_string(),
                    name: Some((*name).to_string()),
                    ..NodeRecord::default()
                })
                .collect(),
            links: links
                .iter()
                .map(|(s, t, r)| EdgeRecord {
                    source: (*s).to_string(),
                    target: (*t).to_string(),
                    relation_type: Some((*r).to_string()),
                    ..EdgeRecord::default()
                })
                .collect(),
            ..Dataset::default()
        };
        GraphIndex::from_dataset(&ds)
    }

    #[test]
    fn parallel_edges_merge_into_one_group() {
        let idx = index(
            &[("a", "Alpha"), ("b", "Beta")],
            &[("a", "b", "WORKS_FOR"), ("a", "b", "ADVISES"), ("a", "b", "WORKS_FOR")],
        );
        let groups = group_connections(&idx, "a", None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].relation_types, vec!["ADVISES", "WORKS_FOR"]);
        assert_eq!(groups[0].edges.len(), 3);
        assert_eq!(groups[0].support_count(), 3);
    }

    #[test]
    fn directions_are_separate_groups() {
        let idx = index(
            &[("a", "Alpha"), ("b", "Beta")],
            &[("a", "b", "KNOWS"), ("b", "a", "KNOWS")],
        );
        let groups = group_connections(&idx, "a", None);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].direction, Direction::Outgoing);
        assert_eq!(groups[1].direction, Direction::Incoming);
    }

    #[test]
    fn ordering_is_outgoing_then_relation_then_name() {
        let idx = index(
            &[("f", "Focal"), ("z", "Zed"), ("y", "Yan"), ("x", "Xia"), ("w", "Wu")],
            &[
                ("w", "f", "AAA"),
                ("f", "z", "KNOWS"),
                ("f", "y", "FUNDS"),
                ("f", "x", "KNOWS"),
            ],
        );
        let names: Vec<_> = group_connections(&idx, "f", None)
            .into_iter()
            .map(|g| g.neighbor_name)
            .collect();
        assert_eq!(names, vec!["Yan", "Xia", "Zed", "Wu"]);
    }

    #[test]
    fn relation_filter_keeps_groups_containing_tag() {
        let idx = index(
            &[("a", "A"), ("b", "B"), ("c", "C")],
            &[("a", "b", "KNOWS"), ("a", "b", "FUNDS"), ("a", "c", "KNOWS")],
        );
        let groups = group_connections(&idx, "a", Some("FUNDS"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].neighbor_id, "b");
        // The whole group is kept, not just the matching edge.
        assert_eq!(groups[0].edges.len(), 2);
    }

    #[test]
    fn unknown_focal_is_empty() {
        let idx = index(&[("a", "A")], &[]);
        assert!(group_connections(&idx, "nope", None).is_empty());
    }

    #[test]
    fn relation_counts_sum_edges() {
        let idx = index(
            &[("a", "A"), ("b", "B"), ("c", "C")],
            &[("a", "b", "KNOWS"), ("a", "b", "FUNDS"), ("c", "a", "KNOWS")],
        );
        let groups = group_connections(&idx, "a", None);
        let counts = relation_type_counts(&groups);
        assert_eq!(counts["KNOWS"], 2);
        assert_eq!(counts["FUNDS"], 1);
        assert_eq!(position_of_neighbor(&groups, "c"), Some(1));
    }
}
