//! Per-node and per-edge presentation derived from the session.
//!
//! A [`Scene`] lists only what is visible. It is rebuilt from scratch after
//! every transition, so no visual state can leak from one focus to the next.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::config::ExplorerConfig;
use crate::focus::{FocusState, focus_neighborhood, secondary_neighbors};
use crate::index::GraphIndex;
use crate::input::Target;
use crate::label;
use crate::model::Edge;
use crate::session::Session;

const SEARCH_MATCH_FONT: f64 = 18.0;
const SEARCH_NEIGHBOR_FONT: f64 = 12.0;
const SEARCH_NEIGHBOR_OPACITY: f64 = 0.8;
const SEARCH_MISS_OPACITY: f64 = 0.1;
const HOVER_EDGE_FONT: f64 = 12.0;

const CONTEXT_WIDTH: f64 = 1.0;
const FOCUS_WIDTH: f64 = 1.5;
const HOVER_WIDTH: f64 = 2.0;
const TRAIL_WIDTH: f64 = 2.5;
const PAIR_WIDTH: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Overview node, no search active.
    Context,
    Focus,
    Neighbor,
    Trail,
    /// The neighbor of the selected connection.
    Paired,
    /// A neighbor of the paired node.
    Ghost,
    /// A neighbor of the focus kept barely visible during pairing.
    Dimmed,
    SearchMatch,
    SearchNeighbor,
    SearchMiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRole {
    Context,
    Focus,
    Pair,
    Trail,
    Ghost,
    Dimmed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub role: NodeRole,
    pub opacity: f64,
    pub label: bool,
    pub font_size: f64,
    pub stroke: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub role: EdgeRole,
    pub opacity: f64,
    /// Perspective-aware relation label, when one is drawn.
    pub label: Option<String>,
    pub font_size: f64,
    pub width: f64,
    /// Curvature; parallel edges get increasing values so they fan out.
    pub roundness: f64,
}

/// Everything currently drawn, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    nodes: HashMap<String, NodeView>,
    edges: HashMap<String, EdgeView>,
    static_edge_labels: bool,
}

impl Scene {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodeView> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&EdgeView> {
        self.edges.get(id)
    }

    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeView)> {
        self.nodes.iter().map(|(id, v)| (id.as_str(), v))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &EdgeView)> {
        self.edges.iter().map(|(id, v)| (id.as_str(), v))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Visible node ids, sorted.
    #[must_use]
    pub fn visible_node_ids(&self) -> BTreeSet<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    /// Ids of nodes with `role`, sorted.
    #[must_use]
    pub fn with_role(&self, role: NodeRole) -> BTreeSet<&str> {
        self.nodes
            .iter()
            .filter(|(_, v)| v.role == role)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// True when edge labels are drawn without hovering.
    #[must_use]
    pub const fn static_edge_labels(&self) -> bool {
        self.static_edge_labels
    }

    fn place(&mut self, id: &str, view: NodeView) {
        self.nodes.entry(id.to_string()).or_insert(view);
    }
}

/// Build the scene for the current session.
#[must_use]
pub fn compose(index: &GraphIndex, session: &Session, config: &ExplorerConfig) -> Scene {
    let mut scene = match session.focus() {
        FocusState::Overview => overview(index, session),
        FocusState::Focused { node } => focused(index, session, config, node),
        FocusState::Paired { node, neighbor, .. } => paired(index, session, config, node, neighbor),
    };
    apply_hover(&mut scene, index, session, config);
    scene
}

fn overview(index: &GraphIndex, session: &Session) -> Scene {
    let filters = session.filters();
    let typo = session.typography();
    let mut scene = Scene::default();

    for node in index.nodes().filter(|n| filters.node_passes(n)) {
        let view = match session.search() {
            Some(hits) if hits.is_match(&node.id) => NodeView {
                role: NodeRole::SearchMatch,
                opacity: 1.0,
                label: true,
                font_size: SEARCH_MATCH_FONT,
                stroke: typo.stroke,
            },
            Some(hits) if hits.is_neighbor(&node.id) => NodeView {
                role: NodeRole::SearchNeighbor,
                opacity: SEARCH_NEIGHBOR_OPACITY,
                label: true,
                font_size: SEARCH_NEIGHBOR_FONT,
                stroke: typo.stroke,
            },
            Some(_) => NodeView {
                role: NodeRole::SearchMiss,
                opacity: SEARCH_MISS_OPACITY,
                label: false,
                font_size: 0.0,
                stroke: typo.stroke,
            },
            None => NodeView {
                role: NodeRole::Context,
                opacity: 1.0,
                label: true,
                font_size: typo.node_font,
                stroke: typo.stroke,
            },
        };
        scene.place(&node.id, view);
    }

    for edge in index.edges().filter(|e| filters.edge_passes(e)) {
        let (Some(a), Some(b)) = (scene.node(&edge.source), scene.node(&edge.target)) else {
            continue;
        };
        let opacity = a.opacity.min(b.opacity);
        scene.edges.insert(
            edge.id.clone(),
            EdgeView {
                role: EdgeRole::Context,
                opacity,
                label: None,
                font_size: 0.0,
                width: CONTEXT_WIDTH,
                roundness: 0.0,
            },
        );
    }
    scene
}

fn focused(index: &GraphIndex, session: &Session, config: &ExplorerConfig, focal: &str) -> Scene {
    let exempt = session.exempt_ids();
    let Some(hood) = focus_neighborhood(
        index,
        session.filters(),
        focal,
        &exempt,
        config.focus.neighbor_cap,
    ) else {
        return Scene::default();
    };
    let typo = session.typography();
    let trail = session.trail();
    let mut scene = Scene::default();

    let view = |role: NodeRole, label: bool| NodeView {
        role,
        opacity: 1.0,
        label,
        font_size: typo.node_font,
        stroke: typo.stroke,
    };
    scene.place(focal, view(NodeRole::Focus, true));
    for id in &hood.neighbors {
        if trail.contains(id) {
            scene.place(id, view(NodeRole::Trail, true));
        } else {
            scene.place(id, view(NodeRole::Neighbor, session.labels().labels(id)));
        }
    }
    for id in &hood.pinned {
        scene.place(id, view(NodeRole::Trail, true));
    }

    let static_labels = scene.node_count() <= config.focus.static_edge_label_limit;
    scene.static_edge_labels = static_labels;

    let mut picked: Vec<(&Edge, EdgeRole, &str)> = Vec::new();
    for edge in index.edges().filter(|e| session.filters().edge_passes(e)) {
        if !(scene.is_visible(&edge.source) && scene.is_visible(&edge.target)) {
            continue;
        }
        if edge.source == focal || edge.target == focal {
            picked.push((edge, EdgeRole::Focus, focal));
        } else if let Some(from) = trail_hop_origin(session, edge) {
            picked.push((edge, EdgeRole::Trail, from));
        }
    }

    let roundness = parallel_roundness(picked.iter().map(|(e, _, _)| *e));
    let fallback = config.labels.inverse_fallback;
    for ((edge, role, perspective), round) in picked.into_iter().zip(roundness) {
        let label = static_labels.then(|| label::label(&edge.relation_type, perspective, edge, fallback));
        let width = if role == EdgeRole::Trail {
            TRAIL_WIDTH
        } else {
            FOCUS_WIDTH
        };
        scene.edges.insert(
            edge.id.clone(),
            EdgeView {
                role,
                opacity: 1.0,
                label,
                font_size: typo.edge_font,
                width,
                roundness: round,
            },
        );
    }
    scene
}

fn paired(
    index: &GraphIndex,
    session: &Session,
    config: &ExplorerConfig,
    focal: &str,
    neighbor: &str,
) -> Scene {
    let filters = session.filters();
    let exempt = session.exempt_ids();
    let Some(hood) = focus_neighborhood(index, filters, focal, &exempt, config.focus.neighbor_cap)
    else {
        return Scene::default();
    };
    if !index.contains(neighbor) {
        return Scene::default();
    }
    let ghosts = secondary_neighbors(
        index,
        filters,
        focal,
        neighbor,
        &exempt,
        config.focus.secondary_cap,
    );
    let typo = session.typography();
    let view = |role: NodeRole, opacity: f64, label: bool| NodeView {
        role,
        opacity,
        label,
        font_size: typo.node_font,
        stroke: typo.stroke,
    };

    let mut scene = Scene::default();
    scene.place(focal, view(NodeRole::Focus, 1.0, true));
    scene.place(neighbor, view(NodeRole::Paired, 1.0, true));
    for id in exempt.iter().filter(|id| index.contains(id)) {
        scene.place(id, view(NodeRole::Trail, 1.0, true));
    }
    let ghost_opacity = config.focus.ghost_opacity;
    for id in &ghosts {
        scene.place(id, view(NodeRole::Ghost, ghost_opacity, session.labels().labels(id)));
    }
    let dim_opacity = config.focus.dim_opacity;
    for id in &hood.neighbors {
        scene.place(id, view(NodeRole::Dimmed, dim_opacity, false));
    }

    let role_of = |id: &str| scene.node(id).map(|v| v.role);
    let mut picked: Vec<(&Edge, EdgeRole, f64, &str)> = Vec::new();
    for edge in index.edges().filter(|e| filters.edge_passes(e)) {
        if edge.joins(focal, neighbor) {
            picked.push((edge, EdgeRole::Pair, 1.0, focal));
            continue;
        }
        let (Some(a), Some(b)) = (role_of(&edge.source), role_of(&edge.target)) else {
            continue;
        };
        let touches = |id: &str| edge.source == id || edge.target == id;
        if touches(neighbor) && (a == NodeRole::Ghost || b == NodeRole::Ghost) {
            picked.push((edge, EdgeRole::Ghost, ghost_opacity, neighbor));
        } else if touches(focal) && (a == NodeRole::Dimmed || b == NodeRole::Dimmed) {
            picked.push((edge, EdgeRole::Dimmed, dim_opacity, focal));
        } else if let Some(from) = trail_hop_origin(session, edge) {
            picked.push((edge, EdgeRole::Trail, 1.0, from));
        }
    }

    let roundness = parallel_roundness(picked.iter().map(|(e, _, _, _)| *e));
    let fallback = config.labels.inverse_fallback;
    let mut edges = HashMap::with_capacity(picked.len());
    for ((edge, role, opacity, perspective), round) in picked.into_iter().zip(roundness) {
        let (label, width) = match role {
            EdgeRole::Pair => (
                Some(label::label(&edge.relation_type, perspective, edge, fallback)),
                PAIR_WIDTH,
            ),
            EdgeRole::Trail => (None, TRAIL_WIDTH),
            _ => (None, CONTEXT_WIDTH),
        };
        edges.insert(
            edge.id.clone(),
            EdgeView {
                role,
                opacity,
                label,
                font_size: typo.edge_font,
                width,
                roundness: round,
            },
        );
    }
    scene.edges = edges;
    scene
}

/// The node a trail hop departed from, when `edge` lies on one.
fn trail_hop_origin<'a>(session: &'a Session, edge: &Edge) -> Option<&'a str> {
    session
        .trail()
        .hops()
        .find(|(from, to)| edge.joins(from, to))
        .map(|(from, _)| from)
}

/// Curvature for each edge, fanning out parallel edges between one pair.
fn parallel_roundness<'a>(edges: impl Iterator<Item = &'a Edge> + Clone) -> Vec<f64> {
    let pair_key = |e: &Edge| {
        if e.source <= e.target {
            (e.source.clone(), e.target.clone())
        } else {
            (e.target.clone(), e.source.clone())
        }
    };
    let mut totals: HashMap<(String, String), usize> = HashMap::new();
    for edge in edges.clone() {
        *totals.entry(pair_key(edge)).or_insert(0) += 1;
    }
    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    edges
        .map(|edge| {
            let key = pair_key(edge);
            let total = totals.get(&key).copied().unwrap_or(1);
            let slot = seen.entry(key).or_insert(0);
            let idx = *slot;
            *slot += 1;
            if total > 1 {
                #[allow(clippy::cast_precision_loss)]
                let idx = idx as f64;
                0.2f64.mul_add(idx, 0.15)
            } else {
                0.1
            }
        })
        .collect()
}

fn apply_hover(scene: &mut Scene, index: &GraphIndex, session: &Session, config: &ExplorerConfig) {
    let fallback = config.labels.inverse_fallback;
    match session.hover() {
        Some(Target::Node(id)) if scene.is_visible(id) => {
            let mut reveal = Vec::new();
            for edge in index.incident_edges(id) {
                if let Some(view) = scene.edges.get_mut(&edge.id) {
                    view.width = view.width.max(HOVER_WIDTH);
                    if view.label.is_none() {
                        view.label = Some(label::label(&edge.relation_type, id, edge, fallback));
                        view.font_size = HOVER_EDGE_FONT;
                    }
                    if let Some(other) = edge.other_end(id) {
                        reveal.push(other.to_string());
                    }
                }
            }
            reveal.push(id.clone());
            for other in reveal {
                if let Some(node) = scene.nodes.get_mut(&other) {
                    if node.opacity > SEARCH_MISS_OPACITY {
                        node.label = true;
                    }
                }
            }
        }
        Some(Target::Edge(id)) => {
            let Some(edge) = index.edge(id) else {
                return;
            };
            let perspective = session
                .focus()
                .focal()
                .filter(|f| edge.source == *f || edge.target == *f)
                .unwrap_or(edge.source.as_str());
            if let Some(view) = scene.edges.get_mut(id) {
                view.width = view.width.max(HOVER_WIDTH);
                if view.label.is_none() {
                    view.label = Some(label::label(&edge.relation_type, perspective, edge, fallback));
                    view.font_size = HOVER_EDGE_FONT;
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Edge;

    fn edge(id: &str, s: &str, t: &str) -> Edge {
        Edge {
            id: id.to_string(),
            source: s.to_string(),
            target: t.to_string(),
            relation_type: "R".to_string(),
            confidence: None,
            support_count: 1,
            support_doc_count: 0,
            evidence: None,
        }
    }

    #[test]
    fn parallel_edges_fan_out() {
        let edges = [edge("1", "a", "b"), edge("2", "b", "a"), edge("3", "a", "c"), edge("4", "a", "b")];
        let round = parallel_roundness(edges.iter());
        let expected = [0.15, 0.35, 0.1, 0.55];
        for (got, want) in round.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }
}
