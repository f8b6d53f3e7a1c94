//! Assertion helpers for gesture output.
//!
//! Velocities and movements come out of floating point sums, so most checks
//! need a tolerance.

use panwheel_core::VectorXYZ;

/// Fails unless `actual` lies in `expected ± tolerance`. NaN never passes.
#[track_caller]
pub fn assert_approx_eq(actual: f64, expected: f64, tolerance: f64, msg: &str) {
    let within = (expected - tolerance..=expected + tolerance).contains(&actual);
    assert!(
        within,
        "{msg}: {actual} is off by {} from {expected}, allowed {tolerance}",
        actual - expected
    );
}

/// Per-axis [`assert_approx_eq`]; the failure names the axis.
#[track_caller]
pub fn assert_vector_approx_eq(
    actual: VectorXYZ,
    expected: VectorXYZ,
    tolerance: f64,
    msg: &str,
) {
    for ((axis, actual), expected) in ["x", "y", "z"].into_iter().zip(actual).zip(expected) {
        assert_approx_eq(actual, expected, tolerance, &format!("{msg} ({axis} axis)"));
    }
}

/// Fails unless `items` holds exactly `expected` entries.
#[track_caller]
pub fn assert_count<T: std::fmt::Debug>(items: &[T], expected: usize, msg: &str) {
    assert!(
        items.len() == expected,
        "{msg}: wanted {expected} entries, found {}: {items:?}",
        items.len()
    );
}
