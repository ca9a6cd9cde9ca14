//! Detail panel content.
//!
//! The panel is a view model built on demand from the session: a single node
//! card, one card per trail stop while a trail is active, or an edge's
//! evidence. Each card is populated independently through the connection
//! grouper.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::connections::{ConnectionGroup, Direction, group_connections, relation_type_counts};
use crate::index::GraphIndex;
use crate::label::{self, InverseFallback};
use crate::session::{DetailTarget, Session};

/// One connection row: a group plus its perspective label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionRow {
    #[serde(flatten)]
    pub group: ConnectionGroup,
    /// Relation types as read from the focal node, joined with `", "`.
    pub label: String,
}

impl ConnectionRow {
    #[must_use]
    pub fn neighbor_id(&self) -> &str {
        &self.group.neighbor_id
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.group.direction
    }
}

/// Connection rows of `focal`, in grouper order.
#[must_use]
pub fn connection_rows(
    index: &GraphIndex,
    focal: &str,
    relation_filter: Option<&str>,
    fallback: InverseFallback,
) -> Vec<ConnectionRow> {
    group_connections(index, focal, relation_filter)
        .into_iter()
        .map(|group| {
            let label = group
                .relation_types
                .iter()
                .map(|rel| match group.direction {
                    Direction::Outgoing => label::forward_label(rel),
                    Direction::Incoming => label::inverse_label(rel, fallback),
                })
                .collect::<Vec<_>>()
                .join(", ");
            ConnectionRow { group, label }
        })
        .collect()
}

/// How the trail left a card's node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Departure {
    pub relation_label: Option<String>,
    pub direction: Option<Direction>,
    pub destination_id: String,
    pub destination_name: String,
}

/// Everything shown for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCard {
    pub node_id: String,
    pub name: String,
    pub entity_type: String,
    pub community: Option<String>,
    pub degree: usize,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub confidence: Option<f64>,
    pub source_documents: Vec<String>,
    pub rows: Vec<ConnectionRow>,
    /// Relation type → contributing edges across all (unfiltered) rows.
    pub relation_counts: BTreeMap<String, usize>,
    pub connection_filter: Option<String>,
    pub selected: Option<usize>,
    /// Evidence of the selected row is unfolded.
    pub evidence_open: bool,
    pub expanded: bool,
    pub departure: Option<Departure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeDetail {
    pub edge_id: String,
    pub relation_type: String,
    pub source_id: String,
    pub source_name: String,
    pub target_id: String,
    pub target_name: String,
    /// Rounded percentage; absent when the edge has no confidence.
    pub confidence_pct: Option<u8>,
    pub support_count: u32,
    pub support_doc_count: u32,
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DetailPanel {
    Node(NodeCard),
    /// One card per trail stop, the current node last.
    Trail { cards: Vec<NodeCard> },
    Edge(EdgeDetail),
}

struct CardParts<'a> {
    node_id: &'a str,
    filter: Option<&'a str>,
    selected: Option<usize>,
    evidence_open: bool,
    expanded: bool,
    departure: Option<Departure>,
}

fn node_card(index: &GraphIndex, parts: CardParts<'_>, fallback: InverseFallback) -> Option<NodeCard> {
    let node = index.node(parts.node_id)?;
    let all = group_connections(index, parts.node_id, None);
    Some(NodeCard {
        node_id: node.id.clone(),
        name: node.name.clone(),
        entity_type: node.entity_type.clone(),
        community: node.community.clone(),
        degree: node.degree,
        description: node.description.clone(),
        aliases: node.aliases.clone(),
        confidence: node.confidence,
        source_documents: node.source_documents.clone(),
        rows: connection_rows(index, parts.node_id, parts.filter, fallback),
        relation_counts: relation_type_counts(&all),
        connection_filter: parts.filter.map(str::to_string),
        selected: parts.selected,
        evidence_open: parts.evidence_open,
        expanded: parts.expanded,
        departure: parts.departure,
    })
}

/// Edge evidence for `edge_id`.
#[must_use]
pub fn edge_detail(index: &GraphIndex, edge_id: &str) -> Option<EdgeDetail> {
    let edge = index.edge(edge_id)?;
    let name = |id: &str| index.node(id).map_or_else(|| id.to_string(), |n| n.name.clone());
    Some(EdgeDetail {
        edge_id: edge.id.clone(),
        relation_type: edge.relation_type.clone(),
        source_id: edge.source.clone(),
        source_name: name(&edge.source),
        target_id: edge.target.clone(),
        target_name: name(&edge.target),
        confidence_pct: edge.confidence.map(confidence_pct),
        support_count: edge.support_count,
        support_doc_count: edge.support_doc_count,
        evidence: edge.evidence.clone(),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn confidence_pct(confidence: f64) -> u8 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Build the panel for the session, or `None` when it is closed or its
/// target no longer resolves.
#[must_use]
pub fn build(index: &GraphIndex, session: &Session, fallback: InverseFallback) -> Option<DetailPanel> {
    match session.detail() {
        DetailTarget::Closed => None,
        DetailTarget::Edge(id) => edge_detail(index, id).map(DetailPanel::Edge),
        DetailTarget::Node(id) => {
            let focus = session.focus();
            let is_focal = focus.focal() == Some(id.as_str());
            let current = CardParts {
                node_id: id,
                filter: if is_focal { session.connection_filter() } else { None },
                selected: if is_focal { focus.selected_index() } else { None },
                evidence_open: is_focal && session.evidence_open(),
                expanded: session.card_expanded(session.trail().len()),
                departure: None,
            };
            if session.trail().is_empty() || !is_focal {
                return node_card(index, current, fallback).map(DetailPanel::Node);
            }
            let mut cards: Vec<NodeCard> = session
                .trail()
                .entries()
                .iter()
                .enumerate()
                .filter_map(|(pos, entry)| {
                    let departure = Departure {
                        relation_label: entry.relation_label.clone(),
                        direction: entry.direction,
                        destination_id: entry.destination.clone(),
                        destination_name: index
                            .node(&entry.destination)
                            .map_or_else(|| entry.destination.clone(), |n| n.name.clone()),
                    };
                    node_card(
                        index,
                        CardParts {
                            node_id: &entry.node_id,
                            filter: entry.connection_filter.as_deref(),
                            selected: entry.connection_index,
                            evidence_open: false,
                            expanded: session.card_expanded(pos),
                            departure: Some(departure),
                        },
                        fallback,
                    )
                })
                .collect();
            cards.extend(node_card(index, current, fallback));
            Some(DetailPanel::Trail { cards })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn index() -> GraphIndex {
        let ds = Dataset::from_json_str(
            r#"{
                "nodes": [
                    {"id": "law", "name": "Data Act"},
                    {"id": "agency", "name": "Regulator"},
                    {"id": "firm", "name": "Acme"}
                ],
                "links": [
                    {"source": "law", "target": "firm", "relation_type": "GOVERNS", "confidence": 0.876,
                     "support_count": 3, "support_doc_count": 2, "evidence": "Section 4 applies to Acme."},
                    {"source": "agency", "target": "law", "relation_type": "ENFORCES"},
                    {"source": "agency", "target": "law", "relation_type": "SUPPORTS"}
                ]
            }"#,
        )
        .expect("parse");
        GraphIndex::from_dataset(&ds)
    }

    #[test]
    fn incoming_rows_use_inverse_labels() {
        let idx = index();
        let rows = connection_rows(&idx, "law", None, InverseFallback::Heuristic);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].direction(), Direction::Outgoing);
        assert_eq!(rows[0].label, "governs");
        assert_eq!(rows[1].neighbor_id(), "agency");
        assert_eq!(rows[1].label, "enforced by, supported by");

        let rows = connection_rows(&idx, "firm", None, InverseFallback::Heuristic);
        assert_eq!(rows[0].label, "governed by");
    }

    #[test]
    fn edge_detail_rounds_confidence() {
        let idx = index();
        let detail = edge_detail(&idx, "e0").expect("first edge");
        assert_eq!(detail.confidence_pct, Some(88));
        assert_eq!(detail.source_name, "Data Act");
        assert_eq!(detail.target_name, "Acme");
        assert_eq!(detail.support_count, 3);
        assert_eq!(detail.evidence.as_deref(), Some("Section 4 applies to Acme."));
        assert!(edge_detail(&idx, "missing").is_none());
        assert_eq!(edge_detail(&idx, "e1").and_then(|d| d.confidence_pct), None);
    }
}
