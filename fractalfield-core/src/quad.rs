//! World-space view quadrilateral.
//!
//! The camera hands the engine the four world-space corners of the visible
//! region. The quad may be rotated or sheared, so per-pixel coordinates come
//! from bilinear interpolation of the corners rather than an affine map.

use serde::{Deserialize, Serialize};

/// 2D point in world (fractal) space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The four corners of the visible world region, in scan order:
/// `a` = top-left, `b` = top-right, `c` = bottom-right, `d` = bottom-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldQuad {
    pub a: WorldPoint,
    pub b: WorldPoint,
    pub c: WorldPoint,
    pub d: WorldPoint,
}

impl WorldQuad {
    pub fn new(a: WorldPoint, b: WorldPoint, c: WorldPoint, d: WorldPoint) -> Self {
        Self { a, b, c, d }
    }

    /// Axis-aligned quad covering `[left, right] × [top, bottom]`.
    pub fn axis_aligned(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            a: WorldPoint::new(left, top),
            b: WorldPoint::new(right, top),
            c: WorldPoint::new(right, bottom),
            d: WorldPoint::new(left, bottom),
        }
    }

    /// Quad for a rotated view centered at `(cx, cy)` with world extent
    /// `w × h` and rotation `angle` (radians, counter-clockwise).
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let corner = |dx: f64, dy: f64| {
            WorldPoint::new(cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
        };
        let (hw, hh) = (w / 2.0, h / 2.0);
        Self {
            a: corner(-hw, -hh),
            b: corner(hw, -hh),
            c: corner(hw, hh),
            d: corner(-hw, hh),
        }
    }

    /// Bilinear interpolation of the corners at normalized `(u, v)` with
    /// `u, v ∈ [0, 1]` (u along the top edge, v down the left edge).
    pub fn point_at(&self, u: f64, v: f64) -> WorldPoint {
        let left_x = self.a.x + (self.d.x - self.a.x) * v;
        let left_y = self.a.y + (self.d.y - self.a.y) * v;
        let right_x = self.b.x + (self.c.x - self.b.x) * v;
        let right_y = self.b.y + (self.c.y - self.b.y) * v;
        WorldPoint::new(left_x + (right_x - left_x) * u, left_y + (right_y - left_y) * u)
    }
}
