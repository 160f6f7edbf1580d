pub use std::f64::consts::{PI, TAU};

/// Returns the smallest rotation between angles `a` and `b`.
///
/// A positive result is a counter-clockwise rotation and negative is
/// clockwise.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let c = (b - a).rem_euclid(TAU);
    if c > PI {
        c - TAU
    } else {
        c
    }
}
