//! Planar joint geometry.
//!
//! Only the projected x/y image coordinates are used; depth is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Interior angle at vertex `b` between rays `b->a` and `b->c`, in degrees.
///
/// The result is always in `[0, 180]`. Coincident points do not fail:
/// `atan2(0, 0)` is `0`, so a degenerate ray contributes a zero heading and the
/// output stays deterministic.
pub fn angle(a: Point, b: Point, c: Point) -> f64 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let degrees = radians.to_degrees().abs();

    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}
