//! Community regions: padded convex hulls around each community's nodes.
//!
//! # Overview
//!
//! Regions are derived entirely from current node positions and community
//! tags. They are recomputed when the external layout reports that it has
//! settled and on explicit geometry changes, never per frame.
//!
//! ## Algorithm
//!
//! ```text
//! positions grouped by community
//!        ↓  centroid = arithmetic mean
//! < 3 members ──► raw points pushed outward from the centroid
//! ≥ 3 members ──► monotone-chain hull, each vertex pushed outward
//! ```
//!
//! Pushing vertices along the centroid→vertex direction by a fixed distance
//! lets the drawn region clear node radii.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::index::GraphIndex;
use crate::layout::LayoutSource;
use crate::model::Point;

const EPSILON: f64 = 1e-9;

/// The drawn region of one community.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityRegion {
    pub community: String,
    pub centroid: Point,
    /// Closed polygon (last vertex connects to the first), counter-clockwise.
    /// One or two points when the community is too small for a hull.
    pub boundary: Vec<Point>,
    /// Number of positioned members.
    pub members: usize,
}

impl CommunityRegion {
    /// Fewer than two boundary points cannot be drawn as a shape.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.boundary.len() >= 2
    }
}

/// Compute regions for every community that has at least one positioned member.
///
/// Nodes without a community tag or without a position are ignored.
/// Output is sorted by community tag.
#[instrument(skip(index, layout))]
pub fn compute_regions(
    index: &GraphIndex,
    layout: &dyn LayoutSource,
    padding: f64,
) -> Vec<CommunityRegion> {
    let mut groups: BTreeMap<String, Vec<Point>> = BTreeMap::new();
    for node in index.nodes() {
        let Some(community) = node.community.as_ref() else {
            continue;
        };
        if let Some(p) = layout.position(&node.id) {
            groups.entry(community.clone()).or_default().push(p);
        }
    }
    let regions = regions_from_groups(groups, padding);
    debug!(count = regions.len(), "community regions computed");
    regions
}

/// Compute regions from already-grouped member positions.
#[must_use]
pub fn regions_from_groups(
    groups: BTreeMap<String, Vec<Point>>,
    padding: f64,
) -> Vec<CommunityRegion> {
    groups
        .into_iter()
        .filter(|(_, points)| !points.is_empty())
        .map(|(community, points)| region_for(community, &points, padding))
        .collect()
}

fn region_for(community: String, points: &[Point], padding: f64) -> CommunityRegion {
    let centroid = centroid(points);
    let outline = if points.len() < 3 {
        points.to_vec()
    } else {
        convex_hull(points)
    };
    let boundary = outline
        .into_iter()
        .map(|p| pad_outward(p, centroid, padding))
        .collect();
    CommunityRegion {
        community,
        centroid,
        boundary,
        members: points.len(),
    }
}

/// Arithmetic mean of `points`; the origin for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Convex hull by Andrew's monotone chain.
///
/// Returns the hull vertices counter-clockwise starting from the lowest-x
/// point, without repeating the first vertex. Collinear points on hull edges
/// are dropped. Inputs with fewer than three distinct points are returned
/// deduplicated and sorted; all-collinear inputs yield their two extremes.
#[must_use]
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup_by(|a, b| (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON);
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= EPSILON {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= EPSILON {
            upper.pop();
        }
        upper.push(p);
    }

    // The last point of each chain is the first point of the other.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Z component of `(a → b) × (a → c)`; positive for a counter-clockwise turn.
#[must_use]
pub fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x).mul_add(c.y - a.y, -((b.y - a.y) * (c.x - a.x)))
}

fn pad_outward(p: Point, centroid: Point, padding: f64) -> Point {
    let (dx, dy) = (p.x - centroid.x, p.y - centroid.y);
    let len = dx.hypot(dy);
    if len < EPSILON {
        return p;
    }
    Point::new(p.x + dx / len * padding, p.y + dy / len * padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn square_with_interior_point() {
        let hull = convex_hull(&pts(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (5.0, 5.0),
        ]));
        assert_eq!(
            hull,
            pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
        );
    }

    #[test]
    fn collinear_points_collapse_to_extremes() {
        let hull = convex_hull(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (3.0, 3.0)]));
    }

    #[test]
    fn duplicates_do_not_break_the_hull() {
        let hull = convex_hull(&pts(&[(0.0, 0.0), (0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (4.0, 0.0)]));
        assert_eq!(hull.len(), 3);
    }

    #[test]
    fn single_member_region_is_not_drawable() {
        let regions = regions_from_groups(
            BTreeMap::from([("solo".to_string(), pts(&[(3.0, 4.0)]))]),
            40.0,
        );
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].centroid, Point::new(3.0, 4.0));
        assert_eq!(regions[0].boundary, pts(&[(3.0, 4.0)]));
        assert!(!regions[0].is_drawable());
    }

    #[test]
    fn pair_region_pads_away_from_centroid() {
        let regions = regions_from_groups(
            BTreeMap::from([("pair".to_string(), pts(&[(0.0, 0.0), (10.0, 0.0)]))]),
            5.0,
        );
        let r = &regions[0];
        assert_eq!(r.centroid, Point::new(5.0, 0.0));
        assert_eq!(r.boundary, pts(&[(-5.0, 0.0), (15.0, 0.0)]));
        assert!(r.is_drawable());
    }

    #[test]
    fn hull_vertices_are_padded_along_centroid_direction() {
        let regions = regions_from_groups(
            BTreeMap::from([(
                "tri".to_string(),
                pts(&[(0.0, 0.0), (6.0, 0.0), (3.0, 6.0)]),
            )]),
            1.0,
        );
        let r = &regions[0];
        assert_eq!(r.centroid, Point::new(3.0, 2.0));
        // Top vertex moves straight up by the padding.
        assert!(r.boundary.iter().any(|p| (p.x - 3.0).abs() < 1e-9 && (p.y - 7.0).abs() < 1e-9));
        for p in &r.boundary {
            assert!(p.distance(r.centroid) > 2.0);
        }
    }
}
