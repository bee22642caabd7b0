//! Polygon offsetting ("buffering") used by every stage of a clearing run.
//!
//! Positive deltas grow a region, negative deltas shrink it. Round joins are
//! approximated with `steps_per_circle` segments per full turn.

use geo::algorithm::buffer::{BufferStyle, LineJoin};
use geo::{Buffer, MultiPolygon};
use std::f64::consts::PI;

/// Sharpest corner angle still mitred; anything blunter keeps a square corner.
const MITRE_MIN_ANGLE: f64 = 0.01;

/// Round join whose segments subtend `2π / steps_per_circle`.
pub fn round_join(steps_per_circle: u32) -> LineJoin<f64> {
    let steps = steps_per_circle.max(3) as f64;
    LineJoin::Round(2.0 * PI / steps)
}

/// Offset with rounded corners.
pub fn offset_round<G>(geometry: &G, delta: f64, steps_per_circle: u32) -> MultiPolygon<f64>
where
    G: Buffer<Scalar = f64>,
{
    let style = BufferStyle::new(delta).line_join(round_join(steps_per_circle));
    geometry.buffer_with_style(style)
}

/// Offset with mitred (sharp) corners, used for boundary margins.
pub fn offset_mitre<G>(geometry: &G, delta: f64) -> MultiPolygon<f64>
where
    G: Buffer<Scalar = f64>,
{
    let style = BufferStyle::new(delta).line_join(LineJoin::Miter(MITRE_MIN_ANGLE));
    geometry.buffer_with_style(style)
}

/// Offset an area, returning it untouched when `delta` is zero.
pub fn offset_area(area: &MultiPolygon<f64>, delta: f64, steps_per_circle: u32) -> MultiPolygon<f64> {
    if delta == 0.0 {
        return area.clone();
    }
    offset_round(area, delta, steps_per_circle)
}

/// Shrink then regrow by `radius`: removes every part narrower than `2 * radius`
/// and closes the slivers floating-point noise leaves behind.
pub fn open_area(area: &MultiPolygon<f64>, radius: f64, steps_per_circle: u32) -> MultiPolygon<f64> {
    if radius <= 0.0 {
        return area.clone();
    }
    let shrunk = offset_round(area, -radius, steps_per_circle);
    if shrunk.0.is_empty() {
        return shrunk;
    }
    offset_round(&shrunk, radius, steps_per_circle)
}
