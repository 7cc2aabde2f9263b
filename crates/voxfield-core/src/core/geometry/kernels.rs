//! Shared vertex evaluation for the closed-form prism formulas.
//!
//! All closed-form prism responses are alternating sums over the eight vertices of the prism,
//! expressed in coordinates relative to the observation point. The only places where those
//! expressions can degenerate are `ln(a + r)` and `arctan(n / d)`; both are evaluated here
//! under a single policy:
//!
//! - `ln(a + r)` with `a < 0` is rewritten as `ln(b² + c²) − ln(r − a)`. When `b² + c² = 0`
//!   the first term is common to both limits of the alternating sum and is dropped.
//! - `ln(a + r)` with `a + r = 0` (observation point at the vertex) contributes zero.
//! - `arctan(n / d)` with `n = 0` contributes zero. A zero relative coordinate carries the sign
//!   of the side the prism lies on (`+0` at lower limits, `−0` at upper limits), so a point on
//!   a face receives the exterior limit of the field.

use super::prism::Prism;
use nalgebra::Point3;

/// One vertex of a prism relative to an observation point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Corner {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub r: f64,
    /// Product of the limit signs: `-1` for each lower limit, `+1` for each upper limit.
    pub sign: f64,
}

#[inline]
fn lower_offset(bound: f64, coordinate: f64) -> f64 {
    let d = bound - coordinate;
    if d == 0.0 { 0.0 } else { d }
}

#[inline]
fn upper_offset(bound: f64, coordinate: f64) -> f64 {
    let d = bound - coordinate;
    if d == 0.0 { -0.0 } else { d }
}

pub(crate) fn corners(prism: &Prism, point: &Point3<f64>) -> [Corner; 8] {
    let axis_limits = |axis: usize| -> [(f64, f64); 2] {
        [
            (lower_offset(prism.min()[axis], point[axis]), -1.0),
            (upper_offset(prism.max()[axis], point[axis]), 1.0),
        ]
    };
    let xs = axis_limits(0);
    let ys = axis_limits(1);
    let zs = axis_limits(2);

    let mut out = [Corner {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        r: 0.0,
        sign: 0.0,
    }; 8];
    let mut n = 0;
    for &(x, sx) in &xs {
        for &(y, sy) in &ys {
            for &(z, sz) in &zs {
                out[n] = Corner {
                    x,
                    y,
                    z,
                    r: (x * x + y * y + z * z).sqrt(),
                    sign: sx * sy * sz,
                };
                n += 1;
            }
        }
    }
    out
}

/// Stable `ln(a + r)` where `r = sqrt(a² + b² + c²)`.
#[inline]
pub(crate) fn ln_sum(a: f64, b: f64, c: f64, r: f64) -> f64 {
    if a < 0.0 {
        let perpendicular = b * b + c * c;
        if perpendicular > 0.0 {
            perpendicular.ln() - (r - a).ln()
        } else {
            -(r - a).ln()
        }
    } else {
        let sum = a + r;
        if sum > 0.0 { sum.ln() } else { 0.0 }
    }
}

/// `arctan(numerator / denominator)` honouring signed zero denominators.
#[inline]
pub(crate) fn atan_ratio(numerator: f64, denominator: f64) -> f64 {
    if numerator == 0.0 {
        0.0
    } else {
        (numerator / denominator).atan()
    }
}
