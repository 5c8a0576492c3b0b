//! Coordinate Remapping
//!
//! CAD authoring space is X right, Y forward, Z up. The renderer is
//! X right, Y up, Z forward. `(x, y, z) -> (-x, z, y)`.

const PRECISION: f64 = 100_000.0;

/// Round to 5 decimal digits, half away from zero
pub fn round5(v: f64) -> f64 {
    let r = (v * PRECISION).round() / PRECISION;
    // Normalize -0.0 so output text never carries "-0.0"
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

pub fn remap_point(p: [f64; 3]) -> [f64; 3] {
    [round5(-p[0]), round5(p[2]), round5(p[1])]
}

/// Inverse of [`remap_point`] without rounding: `(x, y, z) -> (-x, z, y)`
pub fn inverse_remap(p: [f64; 3]) -> [f64; 3] {
    [-p[0], p[2], p[1]]
}
