//! Navigation trail: the stack of focus jumps leading to the current node.

use serde::Serialize;

use crate::connections::Direction;

/// One departure from a focused node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailEntry {
    /// The node that was focused when the jump happened.
    pub node_id: String,
    /// Connection row selected at departure; `None` when leaving the plain
    /// neighborhood view.
    pub connection_index: Option<usize>,
    /// Neighbor paired with `node_id` at departure. Not necessarily the
    /// destination: a double-click can leave for any visible node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paired_neighbor: Option<String>,
    /// Detail-panel relation filter active at departure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_filter: Option<String>,
    /// Perspective label of the connection that was followed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Where the jump went.
    pub destination: String,
}

/// LIFO stack of [`TrailEntry`]. The current focus is not stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Trail {
    entries: Vec<TrailEntry>,
}

impl Trail {
    pub fn push(&mut self, entry: TrailEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<TrailEntry> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn last(&self) -> Option<&TrailEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.node_id == id)
    }

    /// Node ids from the first focused node onwards.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.node_id.as_str())
    }

    /// Position of the most recent entry departing from `id`.
    #[must_use]
    pub fn rposition(&self, id: &str) -> Option<usize> {
        self.entries.iter().rposition(|e| e.node_id == id)
    }

    /// Drop the entry at `pos` and everything after it, returning that entry.
    pub fn truncate_to(&mut self, pos: usize) -> Option<TrailEntry> {
        if pos >= self.entries.len() {
            return None;
        }
        let entry = self.entries.swap_remove(pos);
        self.entries.truncate(pos);
        Some(entry)
    }

    /// `(from, to)` pairs of every recorded jump.
    pub fn hops(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.node_id.as_str(), e.destination.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(node: &str, dest: &str, idx: Option<usize>) -> TrailEntry {
        TrailEntry {
            node_id: node.to_string(),
            connection_index: idx,
            paired_neighbor: idx.map(|_| dest.to_string()),
            connection_filter: None,
            relation_label: None,
            direction: None,
            destination: dest.to_string(),
        }
    }

    #[test]
    fn truncate_returns_the_cut_entry() {
        let mut trail = Trail::default();
        trail.push(entry("a", "b", Some(0)));
        trail.push(entry("b", "c", None));
        trail.push(entry("c", "d", Some(3)));
        let cut = trail.truncate_to(1).expect("in range");
        assert_eq!(cut.node_id, "b");
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.last().map(|e| e.node_id.as_str()), Some("a"));
        assert!(trail.truncate_to(5).is_none());
    }

    #[test]
    fn rposition_finds_latest_visit() {
        let mut trail = Trail::default();
        trail.push(entry("a", "b", None));
        trail.push(entry("b", "a", None));
        trail.push(entry("a", "c", None));
        assert_eq!(trail.rposition("a"), Some(2));
        assert!(trail.contains("b"));
        assert!(!trail.contains("c"));
        assert_eq!(trail.hops().count(), 3);
    }

    proptest! {
        #[test]
        fn pops_mirror_pushes(ids in proptest::collection::vec("[a-e]{1,3}", 1..20)) {
            let mut trail = Trail::default();
            for (i, id) in ids.iter().enumerate() {
                trail.push(entry(id, "x", Some(i)));
            }
            for (i, id) in ids.iter().enumerate().rev() {
                let popped = trail.pop().expect("entry");
                prop_assert_eq!(&popped.node_id, id);
                prop_assert_eq!(popped.connection_index, Some(i));
            }
            prop_assert!(trail.is_empty());
        }
    }
}
