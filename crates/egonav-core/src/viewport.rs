//! Camera fitting, animation and zoom-aware typography.
//!
//! # Coordinates
//!
//! World space is the layout's coordinate system. Screen space is pixels with
//! the origin at the top-left of the canvas and `y` growing downwards, as in
//! world space. A camera maps the world point `center` to the middle of the
//! full canvas and multiplies distances by `scale`:
//!
//! ```text
//! screen = (world - center) * scale + canvas / 2
//! ```
//!
//! Side panels and the focus banner are drawn over the canvas, so a fit
//! centres the target box inside the unobstructed rectangle rather than the
//! full canvas.

use std::time::Duration;

use serde::Serialize;

use crate::config::ViewportConfig;
use crate::model::Point;

/// Canvas size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Screen pixels hidden behind panels on each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Occlusion {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Where the camera looks and how far it is zoomed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub center: Point,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Point::default(),
            scale: 1.0,
        }
    }
}

impl Camera {
    #[must_use]
    pub fn world_to_screen(&self, p: Point, size: ViewportSize) -> Point {
        Point::new(
            (p.x - self.center.x).mul_add(self.scale, size.width / 2.0),
            (p.y - self.center.y).mul_add(self.scale, size.height / 2.0),
        )
    }

    #[must_use]
    pub fn screen_to_world(&self, p: Point, size: ViewportSize) -> Point {
        Point::new(
            (p.x - size.width / 2.0) / self.scale + self.center.x,
            (p.y - size.height / 2.0) / self.scale + self.center.y,
        )
    }
}

/// Fit `points` into the unobstructed part of the canvas.
///
/// The bounding box is grown by `padding` on every side and the scale is
/// capped at `scale_cap`. Returns `None` for an empty slice.
#[must_use]
pub fn fit(
    points: &[Point],
    size: ViewportSize,
    occlusion: Occlusion,
    padding: f64,
    scale_cap: f64,
) -> Option<Camera> {
    let first = points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    let range_x = (max_x - min_x + 2.0 * padding).max(1.0);
    let range_y = (max_y - min_y + 2.0 * padding).max(1.0);

    let visible_w = (size.width - occlusion.left - occlusion.right).max(1.0);
    let visible_h = (size.height - occlusion.top - occlusion.bottom).max(1.0);
    let scale = (visible_w / range_x).min(visible_h / range_y).min(scale_cap);

    // Offset of the unobstructed centre from the canvas centre, in pixels.
    let shift_x = occlusion.left + visible_w / 2.0 - size.width / 2.0;
    let shift_y = occlusion.top + visible_h / 2.0 - size.height / 2.0;

    let mid = Point::new(f64::midpoint(min_x, max_x), f64::midpoint(min_y, max_y));
    Some(Camera {
        center: Point::new(mid.x - shift_x / scale, mid.y - shift_y / scale),
        scale,
    })
}

/// `easeInOutQuad` on `t ∈ [0, 1]`.
#[must_use]
pub fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        (4.0 - 2.0 * t).mul_add(t, -1.0)
    }
}

/// A camera move in progress. A newer animation simply replaces this one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimation {
    pub from: Camera,
    pub to: Camera,
    pub started: Duration,
    pub duration: Duration,
}

impl CameraAnimation {
    #[must_use]
    pub const fn new(from: Camera, to: Camera, started: Duration, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    /// Camera at time `now`.
    #[must_use]
    pub fn sample(&self, now: Duration) -> Camera {
        if self.is_finished(now) {
            return self.to;
        }
        let elapsed = now.saturating_sub(self.started).as_secs_f64();
        let t = ease_in_out_quad(elapsed / self.duration.as_secs_f64());
        let lerp = |a: f64, b: f64| (b - a).mul_add(t, a);
        Camera {
            center: Point::new(
                lerp(self.from.center.x, self.to.center.x),
                lerp(self.from.center.y, self.to.center.y),
            ),
            scale: lerp(self.from.scale, self.to.scale),
        }
    }

    #[must_use]
    pub fn is_finished(&self, now: Duration) -> bool {
        self.duration.is_zero() || now >= self.started + self.duration
    }
}

/// Label font size and outline width in world units.
///
/// Dividing a screen-space constant by the scale keeps the apparent size
/// fixed whatever the zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Typography {
    pub node_font: f64,
    pub edge_font: f64,
    pub stroke: f64,
}

impl Typography {
    /// Unscaled defaults used outside focus mode.
    #[must_use]
    pub const fn overview(config: &ViewportConfig) -> Self {
        Self {
            node_font: config.node_font,
            edge_font: 0.0,
            stroke: config.stroke,
        }
    }

    /// Neighborhood view at `scale`.
    #[must_use]
    pub fn focus(config: &ViewportConfig, scale: f64) -> Self {
        Self {
            node_font: (config.node_font / scale).round(),
            edge_font: (config.edge_font / scale).round(),
            stroke: config.stroke.max((config.stroke / scale).round()),
        }
    }

    /// Pair view at `scale`: larger text and a heavier outline.
    #[must_use]
    pub fn pair(config: &ViewportConfig, scale: f64) -> Self {
        Self {
            node_font: (config.pair_node_font / scale).round(),
            edge_font: (config.edge_font / scale).round(),
            stroke: config.pair_stroke.max((config.pair_stroke / scale).round()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: ViewportSize = ViewportSize {
        width: 1000.0,
        height: 600.0,
    };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn fit_without_occlusion_centres_the_box() {
        let cam = fit(
            &[Point::new(0.0, 0.0), Point::new(100.0, 50.0)],
            SIZE,
            Occlusion::default(),
            0.0,
            10.0,
        )
        .expect("non-empty");
        assert!(close(cam.scale, 10.0));
        assert!(close(cam.center.x, 50.0) && close(cam.center.y, 25.0));
    }

    #[test]
    fn fit_respects_scale_cap_and_padding() {
        let cam = fit(&[Point::new(5.0, 5.0)], SIZE, Occlusion::default(), 200.0, 1.5)
            .expect("non-empty");
        // 600 / 400 = 1.5 and 1000 / 400 = 2.5, capped to 1.5.
        assert!(close(cam.scale, 1.5));
        let cam = fit(&[Point::new(5.0, 5.0)], SIZE, Occlusion::default(), 300.0, 1.5)
            .expect("non-empty");
        assert!(close(cam.scale, 1.0));
    }

    #[test]
    fn occluded_fit_centres_in_visible_region() {
        let occlusion = Occlusion {
            left: 300.0,
            right: 100.0,
            top: 0.0,
            bottom: 0.0,
        };
        let a = Point::new(-50.0, -50.0);
        let b = Point::new(50.0, 50.0);
        let cam = fit(&[a, b], SIZE, occlusion, 0.0, 100.0).expect("non-empty");
        // Visible region is x ∈ [300, 900]; its centre is 600.
        let mid = cam.world_to_screen(Point::new(0.0, 0.0), SIZE);
        assert!(close(mid.x, 600.0));
        assert!(close(mid.y, 300.0));
        // Box fits the visible height exactly.
        assert!(close(cam.scale, 6.0));
        assert!(cam.world_to_screen(a, SIZE).x >= 300.0 - 1e-6);
        assert!(cam.world_to_screen(b, SIZE).x <= 900.0 + 1e-6);
    }

    #[test]
    fn empty_fit_is_none() {
        assert!(fit(&[], SIZE, Occlusion::default(), 200.0, 1.5).is_none());
    }

    #[test]
    fn screen_world_round_trip() {
        let cam = Camera {
            center: Point::new(10.0, -4.0),
            scale: 0.25,
        };
        let p = Point::new(123.0, 45.0);
        let back = cam.screen_to_world(cam.world_to_screen(p, SIZE), SIZE);
        assert!(close(back.x, p.x) && close(back.y, p.y));
    }

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert!(close(ease_in_out_quad(0.0), 0.0));
        assert!(close(ease_in_out_quad(0.5), 0.5));
        assert!(close(ease_in_out_quad(1.0), 1.0));
        assert!(ease_in_out_quad(0.25) < 0.25);
        assert!(ease_in_out_quad(0.75) > 0.75);
    }

    #[test]
    fn animation_interpolates_then_lands() {
        let from = Camera::default();
        let to = Camera {
            center: Point::new(100.0, 0.0),
            scale: 3.0,
        };
        let anim = CameraAnimation::new(from, to, Duration::from_millis(100), Duration::from_millis(400));
        assert_eq!(anim.sample(Duration::ZERO), from);
        let mid = anim.sample(Duration::from_millis(300));
        assert!(close(mid.center.x, 50.0));
        assert!(close(mid.scale, 2.0));
        assert!(anim.is_finished(Duration::from_millis(500)));
        assert_eq!(anim.sample(Duration::from_millis(900)), to);
    }

    #[test]
    fn typography_scales_inversely() {
        let cfg = ViewportConfig::default();
        let zoomed_out = Typography::focus(&cfg, 0.5);
        assert!(close(zoomed_out.node_font, 28.0));
        assert!(close(zoomed_out.stroke, 4.0));
        let zoomed_in = Typography::focus(&cfg, 1.5);
        assert!(close(zoomed_in.node_font, 9.0));
        assert!(close(zoomed_in.stroke, 2.0));
        let pair = Typography::pair(&cfg, 1.0);
        assert!(close(pair.node_font, 20.0));
        assert!(close(pair.stroke, 3.0));
    }
}
