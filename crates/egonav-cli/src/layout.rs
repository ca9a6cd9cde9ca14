//! Deterministic layout for the terminal explorer and `egonav regions`.
//!
//! Nodes exported with coordinates keep them. The rest are seeded around
//! their community's anchor: anchors sit on a ring, one slot per community in
//! sorted order, and each node is offset from its anchor by a jitter derived
//! from the BLAKE3 hash of its id. The same dataset always yields the same
//! picture.

use std::collections::{BTreeSet, HashMap};
use std::f64::consts::TAU;

use egonav_core::{Dataset, LayoutSource, Point};
use tracing::debug;

/// Radius of the ring community anchors sit on.
const ANCHOR_RADIUS: f64 = 1200.0;
/// Maximum distance of a seeded node from its anchor.
const JITTER: f64 = 250.0;

#[derive(Debug, Clone)]
pub struct SeededLayout {
    positions: HashMap<String, Point>,
    settled: bool,
}

impl SeededLayout {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut positions = dataset.positions();
        let communities: Vec<&str> = dataset
            .nodes
            .iter()
            .filter_map(|n| n.community_tag())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut seeded = 0usize;
        for node in &dataset.nodes {
            if positions.contains_key(&node.id) {
                continue;
            }
            let anchor = node
                .community_tag()
                .and_then(|c| communities.iter().position(|k| *k == c))
                .map_or_else(Point::default, |slot| anchor(slot, communities.len()));
            positions.insert(node.id.clone(), jitter(anchor, &node.id));
            seeded += 1;
        }
        debug!(
            seeded,
            given = positions.len() - seeded,
            communities = communities.len(),
            "seeded layout"
        );
        Self {
            positions,
            settled: false,
        }
    }

    /// Freeze positions; reported through [`LayoutSource::is_settled`].
    pub const fn settle(&mut self) {
        self.settled = true;
    }
}

impl LayoutSource for SeededLayout {
    fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    fn is_settled(&self) -> bool {
        self.settled
    }
}

#[allow(clippy::cast_precision_loss)]
fn anchor(slot: usize, slots: usize) -> Point {
    let angle = TAU * slot as f64 / slots.max(1) as f64;
    Point::new(ANCHOR_RADIUS * angle.cos(), ANCHOR_RADIUS * angle.sin())
}

fn jitter(anchor: Point, id: &str) -> Point {
    let hash = blake3::hash(id.as_bytes());
    let bytes = hash.as_bytes();
    let angle = TAU * f64::from(u16::from_le_bytes([bytes[0], bytes[1]])) / f64::from(u16::MAX);
    let dist = JITTER * f64::from(u16::from_le_bytes([bytes[2], bytes[3]])) / f64::from(u16::MAX);
    Point::new(
        dist.mul_add(angle.cos(), anchor.x),
        dist.mul_add(angle.sin(), anchor.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_json_str(
            r#"{
                "nodes": [
                    {"id": "a", "community": "north"},
                    {"id": "b", "community": "north"},
                    {"id": "c", "community": "south"},
                    {"id": "d", "x": 5.0, "y": -5.0},
                    {"id": "e"}
                ],
                "links": []
            }"#,
        )
        .expect("parse")
    }

    #[test]
    fn given_coordinates_are_kept() {
        let layout = SeededLayout::from_dataset(&dataset());
        assert_eq!(layout.position("d"), Some(Point::new(5.0, -5.0)));
    }

    #[test]
    fn seeded_nodes_stay_near_their_anchor() {
        let layout = SeededLayout::from_dataset(&dataset());
        let north = anchor(0, 2);
        let south = anchor(1, 2);
        for (id, expected) in [("a", north), ("b", north), ("c", south), ("e", Point::default())] {
            let p = layout.position(id).expect("placed");
            assert!(p.distance(expected) <= JITTER + 1e-9, "{id} strayed");
        }
    }

    #[test]
    fn placement_is_deterministic() {
        let first = SeededLayout::from_dataset(&dataset());
        let second = SeededLayout::from_dataset(&dataset());
        for id in ["a", "b", "c", "e"] {
            assert_eq!(first.position(id), second.position(id));
        }
        assert_ne!(first.position("a"), first.position("b"));
    }

    #[test]
    fn settles_on_request() {
        let mut layout = SeededLayout::from_dataset(&dataset());
        assert!(!layout.is_settled());
        layout.settle();
        assert!(layout.is_settled());
    }
}
