//! Global visibility filters and name search.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::config::FilterConfig;
use crate::index::GraphIndex;
use crate::model::{Edge, Node};

/// Hidden entity types, relation types and communities plus a degree floor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    hidden_entity_types: BTreeSet<String>,
    hidden_relation_types: BTreeSet<String>,
    hidden_communities: BTreeSet<String>,
    min_degree: usize,
}

impl Filters {
    #[must_use]
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            hidden_entity_types: config.hidden_entity_types.iter().cloned().collect(),
            hidden_relation_types: config.hidden_relation_types.iter().cloned().collect(),
            hidden_communities: BTreeSet::new(),
            min_degree: config.min_degree,
        }
    }

    /// Node-level predicate: entity type, community and minimum degree.
    #[must_use]
    pub fn node_passes(&self, node: &Node) -> bool {
        !self.hidden_entity_types.contains(&node.entity_type)
            && !node
                .community
                .as_ref()
                .is_some_and(|c| self.hidden_communities.contains(c))
            && node.degree >= self.min_degree
    }

    #[must_use]
    pub fn relation_visible(&self, relation_type: &str) -> bool {
        !self.hidden_relation_types.contains(relation_type)
    }

    #[must_use]
    pub fn edge_passes(&self, edge: &Edge) -> bool {
        self.relation_visible(&edge.relation_type)
    }

    #[must_use]
    pub fn is_entity_type_hidden(&self, entity_type: &str) -> bool {
        self.hidden_entity_types.contains(entity_type)
    }

    #[must_use]
    pub fn is_community_hidden(&self, community: &str) -> bool {
        self.hidden_communities.contains(community)
    }

    #[must_use]
    pub const fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Flip an entity type; returns `true` when it is now hidden.
    pub(crate) fn toggle_entity_type(&mut self, entity_type: &str) -> bool {
        toggle(&mut self.hidden_entity_types, entity_type)
    }

    pub(crate) fn toggle_relation_type(&mut self, relation_type: &str) -> bool {
        toggle(&mut self.hidden_relation_types, relation_type)
    }

    pub(crate) fn toggle_community(&mut self, community: &str) -> bool {
        toggle(&mut self.hidden_communities, community)
    }

    pub(crate) const fn set_min_degree(&mut self, min_degree: usize) {
        self.min_degree = min_degree;
    }
}

fn toggle(set: &mut BTreeSet<String>, key: &str) -> bool {
    if set.remove(key) {
        false
    } else {
        set.insert(key.to_string());
        true
    }
}

/// Result of a name/alias search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHits {
    pub query: String,
    /// Matching node ids in dataset order.
    pub matches: Vec<String>,
    /// Direct neighbors of any match that are not matches themselves.
    #[serde(skip)]
    pub neighbors: HashSet<String>,
}

impl SearchHits {
    #[must_use]
    pub fn is_match(&self, id: &str) -> bool {
        self.matches.iter().any(|m| m == id)
    }

    #[must_use]
    pub fn is_neighbor(&self, id: &str) -> bool {
        self.neighbors.contains(id)
    }
}

/// Case-insensitive substring search over names and aliases.
///
/// Queries shorter than `min_len` characters (after trimming) return `None`,
/// meaning "no search active".
#[must_use]
pub fn search(index: &GraphIndex, query: &str, min_len: usize) -> Option<SearchHits> {
    let query = query.trim();
    if query.chars().count() < min_len.max(1) {
        return None;
    }
    let needle = query.to_lowercase();
    let matches: Vec<String> = index
        .nodes()
        .filter(|n| n.matches_lowercase(&needle))
        .map(|n| n.id.clone())
        .collect();
    let matched: HashSet<&str> = matches.iter().map(String::as_str).collect();
    let mut neighbors = HashSet::new();
    for edge in index.edges() {
        if matched.contains(edge.source.as_str()) && !matched.contains(edge.target.as_str()) {
            neighbors.insert(edge.target.clone());
        }
        if matched.contains(edge.target.as_str()) && !matched.contains(edge.source.as_str()) {
            neighbors.insert(edge.source.clone());
        }
    }
    Some(SearchHits {
        query: query.to_string(),
        matches,
        neighbors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn index() -> GraphIndex {
        let ds = Dataset::from_json_str(
            r#"{
                "nodes": [
                    {"id": "p1", "name": "Ada Lovelace", "entity_type": "PERSON", "community": "C1", "aliases": ["Countess"]},
                    {"id": "p2", "name": "Charles Babbage", "entity_type": "PERSON", "community": "C1"},
                    {"id": "o1", "name": "Analytical Society", "entity_type": "ORGANIZATION", "community": "C2"},
                    {"id": "d1", "name": "Notes", "entity_type": "DOCUMENT"}
                ],
                "links": [
                    {"source": "p1", "target": "p2", "relation_type": "KNOWS"},
                    {"source": "p2", "target": "o1", "relation_type": "MEMBER_OF"},
                    {"source": "p1", "target": "d1", "relation_type": "MENTIONED_IN"}
                ]
            }"#,
        )
        .expect("parse");
        GraphIndex::from_dataset(&ds)
    }

    #[test]
    fn defaults_hide_mentions_and_low_degree() {
        let idx = index();
        let filters = Filters::from_config(&FilterConfig::default());
        assert!(!filters.relation_visible("MENTIONED_IN"));
        assert!(filters.relation_visible("KNOWS"));
        // p1 and p2 have degree 2; o1 and d1 have degree 1.
        assert!(filters.node_passes(idx.node("p1").expect("p1")));
        assert!(!filters.node_passes(idx.node("o1").expect("o1")));
    }

    #[test]
    fn toggles_flip_and_report_state() {
        let idx = index();
        let mut filters = Filters::from_config(&FilterConfig {
            min_degree: 0,
            ..FilterConfig::default()
        });
        assert!(filters.toggle_community("C1"));
        assert!(!filters.node_passes(idx.node("p1").expect("p1")));
        assert!(filters.node_passes(idx.node("d1").expect("d1")));
        assert!(!filters.toggle_community("C1"));
        assert!(filters.node_passes(idx.node("p1").expect("p1")));

        assert!(filters.toggle_entity_type("DOCUMENT"));
        assert!(filters.is_entity_type_hidden("DOCUMENT"));
        assert!(!filters.node_passes(idx.node("d1").expect("d1")));

        assert!(!filters.toggle_relation_type("MENTIONED_IN"));
        assert!(filters.relation_visible("MENTIONED_IN"));
    }

    #[test]
    fn search_matches_names_and_aliases() {
        let idx = index();
        let hits = search(&idx, "countess", 2).expect("active");
        assert_eq!(hits.matches, vec!["p1"]);
        assert!(hits.is_neighbor("p2"));
        assert!(hits.is_neighbor("d1"));
        assert!(!hits.is_neighbor("o1"));

        let hits = search(&idx, "  ES ", 2).expect("active");
        assert_eq!(hits.matches, vec!["p1", "p2", "d1"]);
        assert!(hits.is_neighbor("o1"));
    }

    #[test]
    fn short_queries_clear_search() {
        let idx = index();
        assert!(search(&idx, "a", 2).is_none());
        assert!(search(&idx, "   ", 2).is_none());
    }
}
