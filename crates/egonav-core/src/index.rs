//! Read-only graph index.
//!
//! # Overview
//!
//! [`GraphIndex`] owns the canonical node and edge tables for a session. It
//! is built once from a [`Dataset`] and never mutated. Every other component
//! holds plain string ids and resolves them through the guarded lookups here,
//! so a stale id yields `None` instead of a panic.
//!
//! ## Edge Order
//!
//! Edges keep their dataset order (petgraph assigns `EdgeIndex` values in
//! insertion order). "First discovered" always means "earliest in the
//! dataset", which makes degree-rank ties deterministic.
//!
//! ## Parallel Edges
//!
//! Several edges may join the same pair with different relation types. They
//! are all kept; the degree of a node counts each of them.

use std::collections::{BTreeMap, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::dataset::Dataset;
use crate::model::{Edge, Node};

/// Entity type used when the dataset omits one.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// GraphIndex
// ---------------------------------------------------------------------------

/// A 1-hop neighbor annotated for ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    pub id: String,
    /// Global degree of the neighbor.
    pub degree: usize,
    /// Number of edges joining the neighbor to the queried node.
    pub edge_count: usize,
}

/// Adjacency structure over the dataset's nodes and edges.
#[derive(Debug, Clone)]
pub struct GraphIndex {
    graph: DiGraph<Node, Edge>,
    node_map: HashMap<String, NodeIndex>,
    edge_map: HashMap<String, EdgeIndex>,
    content_hash: String,
}

impl GraphIndex {
    /// Build the index from a decoded dataset.
    ///
    /// Duplicate node ids keep the first record. Edges whose endpoints are
    /// unknown are skipped. Missing degrees are computed from the kept edges.
    #[instrument(skip(dataset), fields(nodes = dataset.nodes.len(), links = dataset.links.len()))]
    #[must_use]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut graph = DiGraph::<Node, Edge>::with_capacity(dataset.nodes.len(), dataset.links.len());
        let mut node_map = HashMap::with_capacity(dataset.nodes.len());
        let mut declared_degree = Vec::with_capacity(dataset.nodes.len());

        for record in &dataset.nodes {
            if node_map.contains_key(&record.id) {
                warn!(id = %record.id, "duplicate node id, keeping first record");
                continue;
            }
            let node = Node {
                id: record.id.clone(),
                name: record
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| record.id.clone()),
                entity_type: record
                    .entity_type
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
                community: record.community_tag().map(str::to_string),
                degree: 0,
                aliases: record.all_aliases(),
                description: record.description.clone().filter(|d| !d.is_empty()),
                confidence: record.confidence.and_then(normalize_confidence),
                source_documents: record.source_documents.clone(),
            };
            let idx = graph.add_node(node);
            node_map.insert(record.id.clone(), idx);
            declared_degree.push(record.degree);
        }

        let mut edge_map = HashMap::with_capacity(dataset.links.len());
        let mut skipped = 0usize;
        for (i, record) in dataset.links.iter().enumerate() {
            let (Some(&src), Some(&tgt)) = (node_map.get(&record.source), node_map.get(&record.target))
            else {
                skipped += 1;
                continue;
            };
            let mut id = record
                .relation_id
                .clone()
                .or_else(|| record.id.clone())
                .unwrap_or_else(|| format!("e{i}"));
            if edge_map.contains_key(&id) {
                id = format!("{id}#{i}");
            }
            let edge = Edge {
                id: id.clone(),
                source: record.source.clone(),
                target: record.target.clone(),
                relation_type: record
                    .relation_type
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
                confidence: record.confidence.and_then(normalize_confidence),
                support_count: record.support_count.unwrap_or(1).max(1),
                support_doc_count: record.support_doc_count.unwrap_or(0),
                evidence: record.evidence.clone().filter(|e| !e.is_empty()),
            };
            let eidx = graph.add_edge(src, tgt, edge);
            edge_map.insert(id, eidx);
        }
        if skipped > 0 {
            warn!(skipped, "edges referencing unknown nodes were skipped");
        }

        let computed: Vec<usize> = graph
            .node_indices()
            .map(|idx| incident_edge_indices(&graph, idx).len())
            .collect();
        for (idx, (declared, counted)) in graph
            .node_indices()
            .zip(declared_degree.into_iter().zip(computed))
            .collect::<Vec<_>>()
        {
            if let Some(node) = graph.node_weight_mut(idx) {
                node.degree = declared.unwrap_or(counted);
            }
        }

        let content_hash = compute_edge_hash(&graph);
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            hash = %content_hash,
            "graph index built"
        );

        Self {
            graph,
            node_map,
            edge_map,
            content_hash,
        }
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_map.get(id).and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Look up an edge by id.
    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_map.get(id).and_then(|&idx| self.graph.edge_weight(idx))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Degree of a node, or `None` for an unknown id.
    #[must_use]
    pub fn degree(&self, id: &str) -> Option<usize> {
        self.node(id).map(|n| n.degree)
    }

    /// All nodes in dataset order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// All edges in dataset order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// BLAKE3 hash of the sorted edge list, identifying the dataset's topology.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Edges touching `id`, both directions, in dataset order. Self-loops
    /// appear once.
    #[must_use]
    pub fn incident_edges(&self, id: &str) -> Vec<&Edge> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        incident_edge_indices(&self.graph, idx)
            .into_iter()
            .filter_map(|e| self.graph.edge_weight(e))
            .collect()
    }

    /// Edges joining `a` and `b` in either direction, in dataset order.
    #[must_use]
    pub fn edges_between(&self, a: &str, b: &str) -> Vec<&Edge> {
        self.incident_edges(a)
            .into_iter()
            .filter(|e| e.joins(a, b))
            .collect()
    }

    /// All 1-hop neighbors of `id`, deduplicated, ranked by global degree
    /// (descending). Ties keep first-discovery order.
    ///
    /// The node itself is never listed, even when it has a self-loop.
    #[must_use]
    pub fn ranked_neighbors(&self, id: &str) -> Vec<Neighbor> {
        let mut out: Vec<Neighbor> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();
        for edge in self.incident_edges(id) {
            let Some(other) = edge.other_end(id) else {
                continue;
            };
            if other == id {
                continue;
            }
            if let Some(&pos) = slot.get(other) {
                out[pos].edge_count += 1;
            } else {
                slot.insert(other, out.len());
                out.push(Neighbor {
                    id: other.to_string(),
                    degree: self.degree(other).unwrap_or(0),
                    edge_count: 1,
                });
            }
        }
        // `sort_by` is stable, so equal degrees keep discovery order.
        out.sort_by(|a, b| b.degree.cmp(&a.degree));
        out
    }

    /// Entity type → node count.
    #[must_use]
    pub fn entity_types(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for node in self.nodes() {
            *out.entry(node.entity_type.clone()).or_insert(0) += 1;
        }
        out
    }

    /// Relation type → edge count.
    #[must_use]
    pub fn relation_types(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for edge in self.edges() {
            *out.entry(edge.relation_type.clone()).or_insert(0) += 1;
        }
        out
    }

    /// Community tag → member count.
    #[must_use]
    pub fn communities(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for community in self.nodes().filter_map(|n| n.community.as_ref()) {
            *out.entry(community.clone()).or_insert(0) += 1;
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn incident_edge_indices(graph: &DiGraph<Node, Edge>, idx: NodeIndex) -> Vec<EdgeIndex> {
    use petgraph::visit::EdgeRef;

    let mut edges: Vec<EdgeIndex> = graph
        .edges_directed(idx, Direction::Outgoing)
        .chain(graph.edges_directed(idx, Direction::Incoming))
        .map(|e| e.id())
        .collect();
    edges.sort_unstable();
    edges.dedup();
    edges
}

fn normalize_confidence(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

fn compute_edge_hash(graph: &DiGraph<Node, Edge>) -> String {
    let mut triples: Vec<(&str, &str, &str)> = graph
        .edge_weights()
        .map(|e| (e.source.as_str(), e.relation_type.as_str(), e.target.as_str()))
        .collect();
    triples.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (source, relation, target) in triples {
        hasher.update(source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(relation.as_bytes());
        hasher.update(b"\x00");
        hasher.update(target.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{EdgeRecord, NodeRecord};

    fn node(id: &str) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            ..NodeRecord::default()
        }
    }

    fn link(source: &str, target: &str, relation: &str) -> EdgeRecord {
        EdgeRecord {
            source: source.to_string(),
            target: target.to_string(),
            relation_type: Some(relation.to_string()),
            ..EdgeRecord::default()
        }
    }

    fn dataset(nodes: &[&str], links: &[(&str, &str, &str)]) -> Dataset {
        Dataset {
            nodes: nodes.iter().map(|id| node(id)).collect(),
            links: links.iter().map(|(s, t, r)| link(s, t, r)).collect(),
            ..Dataset::default()
        }
    }

    #[test]
    fn unknown_ids_resolve_to_none() {
        let index = GraphIndex::from_dataset(&dataset(&["a"], &[]));
        assert!(index.node("zzz").is_none());
        assert!(index.edge("zzz").is_none());
        assert!(index.ranked_neighbors("zzz").is_empty());
        assert!(index.incident_edges("zzz").is_empty());
    }

    #[test]
    fn computed_degree_counts_parallel_edges() {
        let index = GraphIndex::from_dataset(&dataset(
            &["a", "b"],
            &[("a", "b", "KNOWS"), ("b", "a", "EMPLOYS")],
        ));
        assert_eq!(index.degree("a"), Some(2));
        let neighbors = index.ranked_neighbors("a");
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].edge_count, 2);
    }

    #[test]
    fn declared_degree_wins_over_computed() {
        let mut ds = dataset(&["a", "b"], &[("a", "b", "KNOWS")]);
        ds.nodes[1].degree = Some(40);
        let index = GraphIndex::from_dataset(&ds);
        assert_eq!(index.degree("b"), Some(40));
        assert_eq!(index.degree("a"), Some(1));
    }

    #[test]
    fn neighbors_rank_by_degree_with_discovery_tiebreak() {
        // hub: a; b and c have degree 1 (only the hub), d has degree 2.
        let index = GraphIndex::from_dataset(&dataset(
            &["a", "b", "c", "d", "e"],
            &[
                ("a", "b", "R"),
                ("c", "a", "R"),
                ("a", "d", "R"),
                ("d", "e", "R"),
            ],
        ));
        let ids: Vec<_> = index
            .ranked_neighbors("a")
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec!["d", "b", "c"]);
    }

    #[test]
    fn dangling_edges_are_skipped() {
        let index = GraphIndex::from_dataset(&dataset(
            &["a", "b"],
            &[("a", "b", "R"), ("a", "ghost", "R")],
        ));
        assert_eq!(index.edge_count(), 1);
        assert_eq!(index.degree("a"), Some(1));
    }

    #[test]
    fn duplicate_node_ids_keep_first() {
        let mut ds = dataset(&["a", "a"], &[]);
        ds.nodes[0].name = Some("First".to_string());
        ds.nodes[1].name = Some("Second".to_string());
        let index = GraphIndex::from_dataset(&ds);
        assert_eq!(index.node_count(), 1);
        assert_eq!(index.node("a").map(|n| n.name.as_str()), Some("First"));
    }

    #[test]
    fn self_loop_is_not_a_neighbor() {
        let index = GraphIndex::from_dataset(&dataset(&["a"], &[("a", "a", "CITES")]));
        assert_eq!(index.incident_edges("a").len(), 1);
        assert!(index.ranked_neighbors("a").is_empty());
    }

    #[test]
    fn edge_ids_prefer_relation_id_and_stay_unique() {
        let mut ds = dataset(&["a", "b"], &[("a", "b", "R"), ("b", "a", "R"), ("a", "b", "S")]);
        ds.links[0].relation_id = Some("rel-1".to_string());
        ds.links[1].relation_id = Some("rel-1".to_string());
        let index = GraphIndex::from_dataset(&ds);
        assert!(index.edge("rel-1").is_some());
        assert!(index.edge("rel-1#1").is_some());
        assert!(index.edge("e2").is_some());
    }

    #[test]
    fn content_hash_tracks_edge_set() {
        let a = GraphIndex::from_dataset(&dataset(&["a", "b"], &[("a", "b", "R")]));
        let b = GraphIndex::from_dataset(&dataset(&["a", "b"], &[("b", "a", "R")]));
        assert!(a.content_hash().starts_with("blake3:"));
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let mut ds = dataset(&["a", "b"], &[("a", "b", "")]);
        ds.links[0].support_count = Some(0);
        ds.links[0].confidence = Some(1.7);
        let index = GraphIndex::from_dataset(&ds);
        let node = index.node("a").expect("node a");
        assert_eq!(node.name, "a");
        assert_eq!(node.entity_type, UNKNOWN_TYPE);
        let edge = index.edges().next().expect("edge");
        assert_eq!(edge.relation_type, UNKNOWN_TYPE);
        assert_eq!(edge.support_count, 1);
        assert_eq!(edge.confidence, Some(1.0));
    }
}
