//! Focus states and the neighborhood capping policy.
//!
//! A focused node never shows its whole neighborhood. Neighbors are ranked by
//! global degree and cut to a cap; the focal node and every node on the trail
//! bypass both the cap and the global filters.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::filter::Filters;
use crate::index::GraphIndex;

/// Which exploration mode is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FocusState {
    /// The whole (filtered) graph.
    #[default]
    Overview,
    /// One node's capped neighborhood, no connection selected.
    Focused { node: String },
    /// One connection row of `node` selected; `neighbor` is its other end.
    Paired {
        node: String,
        neighbor: String,
        index: usize,
    },
}

impl FocusState {
    /// The focused node, in either focus sub-state.
    #[must_use]
    pub fn focal(&self) -> Option<&str> {
        match self {
            Self::Overview => None,
            Self::Focused { node } | Self::Paired { node, .. } => Some(node),
        }
    }

    #[must_use]
    pub fn paired_neighbor(&self) -> Option<&str> {
        match self {
            Self::Paired { neighbor, .. } => Some(neighbor),
            _ => None,
        }
    }

    /// Selected connection row, if any.
    #[must_use]
    pub const fn selected_index(&self) -> Option<usize> {
        match self {
            Self::Paired { index, .. } => Some(*index),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_overview(&self) -> bool {
        matches!(self, Self::Overview)
    }
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overview => write!(f, "overview"),
            Self::Focused { node } => write!(f, "focused({node})"),
            Self::Paired {
                node,
                neighbor,
                index,
            } => write!(f, "paired({node}, {neighbor}, {index})"),
        }
    }
}

/// The capped neighborhood of a focused node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    pub focal: String,
    /// Shown neighbors, highest degree first.
    pub neighbors: Vec<String>,
    /// Exempt nodes (trail) that are not among `neighbors`.
    pub pinned: Vec<String>,
    /// Neighbor count before filtering and capping.
    pub total: usize,
}

impl Neighborhood {
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.focal == id || self.neighbors.iter().any(|n| n == id) || self.pinned.iter().any(|n| n == id)
    }

    /// Focal node, then neighbors, then pinned trail nodes.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.focal.as_str())
            .chain(self.neighbors.iter().map(String::as_str))
            .chain(self.pinned.iter().map(String::as_str))
    }
}

/// Capped neighborhood of `focal`.
///
/// Neighbors are ranked by degree (ties in discovery order). Those in
/// `exempt` always pass the filters; the first `cap` passing neighbors are
/// kept. Exempt nodes outside that cut are returned as `pinned`. Returns
/// `None` for an unknown `focal`.
#[must_use]
pub fn focus_neighborhood(
    index: &GraphIndex,
    filters: &Filters,
    focal: &str,
    exempt: &BTreeSet<String>,
    cap: usize,
) -> Option<Neighborhood> {
    if !index.contains(focal) {
        return None;
    }
    let ranked = index.ranked_neighbors(focal);
    let total = ranked.len();
    let neighbors: Vec<String> = ranked
        .into_iter()
        .filter(|n| {
            exempt.contains(&n.id) || index.node(&n.id).is_some_and(|node| filters.node_passes(node))
        })
        .take(cap)
        .map(|n| n.id)
        .collect();
    let pinned = exempt
        .iter()
        .filter(|id| id.as_str() != focal && !neighbors.contains(id) && index.contains(id))
        .cloned()
        .collect();
    Some(Neighborhood {
        focal: focal.to_string(),
        neighbors,
        pinned,
        total,
    })
}

/// Ghosted neighbors of the paired node `neighbor`.
///
/// Ranked like [`focus_neighborhood`] and capped at `cap`, skipping `focal`
/// and the exempt nodes (they are drawn at full opacity anyway).
#[must_use]
pub fn secondary_neighbors(
    index: &GraphIndex,
    filters: &Filters,
    focal: &str,
    neighbor: &str,
    exempt: &BTreeSet<String>,
    cap: usize,
) -> Vec<String> {
    index
        .ranked_neighbors(neighbor)
        .into_iter()
        .filter(|n| n.id != focal && !exempt.contains(&n.id))
        .filter(|n| index.node(&n.id).is_some_and(|node| filters.node_passes(node)))
        .take(cap)
        .map(|n| n.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::dataset::{Dataset, EdgeRecord, NodeRecord};

    fn star(spokes: usize) -> GraphIndex {
        let mut nodes = vec![NodeRecord {
            id: "hub".to_string(),
            ..NodeRecord::default()
        }];
        let mut links = Vec::new();
        for i in 0..spokes {
            nodes.push(NodeRecord {
                id: format!("n{i}"),
                degree: Some(100 - i % 7),
                ..NodeRecord::default()
            });
            links.push(EdgeRecord {
                source: "hub".to_string(),
                target: format!("n{i}"),
                relation_type: Some("R".to_string()),
                ..EdgeRecord::default()
            });
        }
        GraphIndex::from_dataset(&Dataset {
            nodes,
            links,
            ..Dataset::default()
        })
    }

    fn open_filters() -> Filters {
        Filters::from_config(&FilterConfig {
            min_degree: 0,
            ..FilterConfig::default()
        })
    }

    #[test]
    fn accessors_follow_variant() {
        let paired = FocusState::Paired {
            node: "a".to_string(),
            neighbor: "b".to_string(),
            index: 2,
        };
        assert_eq!(paired.focal(), Some("a"));
        assert_eq!(paired.paired_neighbor(), Some("b"));
        assert_eq!(paired.selected_index(), Some(2));
        assert_eq!(paired.to_string(), "paired(a, b, 2)");
        assert!(FocusState::Overview.focal().is_none());
        assert!(FocusState::default().is_overview());
    }

    #[test]
    fn cap_keeps_highest_degree_neighbors() {
        let index = star(40);
        let hood = focus_neighborhood(&index, &open_filters(), "hub", &BTreeSet::new(), 25)
            .expect("hub exists");
        assert_eq!(hood.total, 40);
        assert_eq!(hood.neighbors.len(), 25);
        let ranked: Vec<String> = index
            .ranked_neighbors("hub")
            .into_iter()
            .take(25)
            .map(|n| n.id)
            .collect();
        assert_eq!(hood.neighbors, ranked);
        assert!(hood.pinned.is_empty());
    }

    #[test]
    fn exempt_nodes_are_pinned_beyond_cap() {
        let index = star(40);
        // n6 has the lowest degree in every run of seven, so it is never in the top 3.
        let exempt = BTreeSet::from(["n6".to_string()]);
        let hood = focus_neighborhood(&index, &open_filters(), "hub", &exempt, 3).expect("hub");
        assert_eq!(hood.neighbors.len(), 3);
        assert_eq!(hood.pinned, vec!["n6"]);
        assert!(hood.contains("n6"));
        assert_eq!(hood.ids().count(), 5);
    }

    #[test]
    fn min_degree_filter_spares_exempt_nodes() {
        let index = star(5);
        let strict = Filters::from_config(&FilterConfig {
            min_degree: 1000,
            ..FilterConfig::default()
        });
        let exempt = BTreeSet::from(["n2".to_string()]);
        let hood = focus_neighborhood(&index, &strict, "hub", &exempt, 25).expect("hub");
        assert_eq!(hood.neighbors, vec!["n2"]);
    }

    #[test]
    fn unknown_focal_has_no_neighborhood() {
        let index = star(2);
        assert!(focus_neighborhood(&index, &open_filters(), "nope", &BTreeSet::new(), 25).is_none());
    }

    #[test]
    fn secondary_neighbors_skip_focal() {
        let index = star(3);
        let ghosts = secondary_neighbors(&index, &open_filters(), "n0", "hub", &BTreeSet::new(), 10);
        assert!(!ghosts.contains(&"n0".to_string()));
        assert_eq!(ghosts.len(), 2);
    }
}
