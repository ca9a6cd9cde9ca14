//! Layout capability.
//!
//! The engine never computes layout. Positions come from an external process
//! behind [`LayoutSource`]; the engine only reads them and reacts once when
//! the process reports that it has settled.

use std::collections::HashMap;

use crate::model::Point;

/// Read access to node positions owned by an external layout process.
pub trait LayoutSource {
    /// Current position of `id`, or `None` when the node is unknown or unplaced.
    fn position(&self, id: &str) -> Option<Point>;

    /// True once the layout has stabilized. The engine observes the first
    /// `true` and treats positions as stable for the rest of the session.
    fn is_settled(&self) -> bool;

    /// Positions for several ids; unplaced ids are omitted.
    fn positions<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, Point)>
    where
        Self: Sized,
    {
        ids.into_iter()
            .filter_map(|id| self.position(id).map(|p| (id, p)))
            .collect()
    }
}

/// A layout whose positions are supplied up front and may be moved by the
/// owner until it calls [`StaticLayout::settle`].
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    positions: HashMap<String, Point>,
    settled: bool,
}

impl StaticLayout {
    #[must_use]
    pub const fn new(positions: HashMap<String, Point>) -> Self {
        Self {
            positions,
            settled: false,
        }
    }

    /// A layout that reports itself settled immediately.
    #[must_use]
    pub const fn settled(positions: HashMap<String, Point>) -> Self {
        Self {
            positions,
            settled: true,
        }
    }

    /// Move a node. Ignored once settled.
    pub fn set_position(&mut self, id: &str, p: Point) {
        if !self.settled {
            self.positions.insert(id.to_string(), p);
        }
    }

    pub const fn settle(&mut self) {
        self.settled = true;
    }
}

impl LayoutSource for StaticLayout {
    fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    fn is_settled(&self) -> bool {
        self.settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_skip_unplaced_ids() {
        let layout = StaticLayout::settled(HashMap::from([("a".to_string(), Point::new(1.0, 1.0))]));
        let got = layout.positions(["a", "b"]);
        assert_eq!(got, vec![("a", Point::new(1.0, 1.0))]);
    }

    #[test]
    fn positions_freeze_after_settle() {
        let mut layout = StaticLayout::new(HashMap::new());
        layout.set_position("a", Point::new(1.0, 0.0));
        assert!(!layout.is_settled());
        layout.settle();
        layout.set_position("a", Point::new(9.0, 9.0));
        assert_eq!(layout.position("a"), Some(Point::new(1.0, 0.0)));
    }
}
