//! Property tests for community region geometry.

use std::collections::BTreeMap;

use egonav_core::Point;
use egonav_core::region::{centroid, convex_hull, cross, regions_from_groups};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-6;

fn grid_points(min: usize, max: usize) -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((-500i32..500, -500i32..500), min..max).prop_map(|raw| {
        raw.into_iter()
            .map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect()
    })
}

fn in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < -TOLERANCE || d2 < -TOLERANCE || d3 < -TOLERANCE;
    let has_pos = d1 > TOLERANCE || d2 > TOLERANCE || d3 > TOLERANCE;
    !(has_neg && has_pos)
}

/// Containment in a polygon that is star-shaped around `center`.
fn in_fan(p: Point, center: Point, boundary: &[Point]) -> bool {
    (0..boundary.len()).any(|i| {
        let next = boundary[(i + 1) % boundary.len()];
        in_triangle(p, center, boundary[i], next)
    })
}

proptest! {
    #[test]
    fn hull_is_convex_and_counter_clockwise(points in grid_points(3, 60)) {
        let hull = convex_hull(&points);
        prop_assume!(hull.len() >= 3);
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            let c = hull[(i + 2) % hull.len()];
            prop_assert!(cross(a, b, c) > 0.0, "reflex or collinear turn at {:?}", b);
        }
    }

    #[test]
    fn hull_vertices_are_members(points in grid_points(1, 60)) {
        for v in convex_hull(&points) {
            prop_assert!(points.contains(&v));
        }
    }

    #[test]
    fn every_member_lies_on_or_inside_the_hull(points in grid_points(3, 60)) {
        let hull = convex_hull(&points);
        prop_assume!(hull.len() >= 3);
        for p in &points {
            for i in 0..hull.len() {
                let a = hull[i];
                let b = hull[(i + 1) % hull.len()];
                prop_assert!(cross(a, b, *p) >= -TOLERANCE);
            }
        }
    }

    #[test]
    fn padded_region_still_covers_its_members(
        points in grid_points(3, 40),
        padding in 0.0f64..80.0,
    ) {
        prop_assume!(convex_hull(&points).len() >= 3);
        let regions = regions_from_groups(
            BTreeMap::from([("c".to_string(), points.clone())]),
            padding,
        );
        let region = &regions[0];
        prop_assert_eq!(region.members, points.len());
        for p in &points {
            prop_assert!(in_fan(*p, region.centroid, &region.boundary));
        }
    }

    #[test]
    fn small_groups_skip_the_hull(points in grid_points(1, 3), padding in 0.0f64..80.0) {
        let regions = regions_from_groups(
            BTreeMap::from([("c".to_string(), points.clone())]),
            padding,
        );
        let region = &regions[0];
        prop_assert_eq!(region.boundary.len(), points.len());
        prop_assert_eq!(region.centroid, centroid(&points));
        for (raw, padded) in points.iter().zip(&region.boundary) {
            let before = raw.distance(region.centroid);
            let after = padded.distance(region.centroid);
            if before > TOLERANCE {
                prop_assert!((after - before - padding).abs() < 1e-6);
            } else {
                prop_assert_eq!(raw, padded);
            }
        }
    }
}
