//! Fixed-size vector helpers used by the wheel pipeline.
//!
//! Axis vectors are plain `[f64; 3]` arrays (x, y, z), so the helpers here
//! never see operands of different lengths.

/// Per-axis values in x, y, z order.
pub type VectorXYZ = [f64; 3];

/// Per-axis flags in x, y, z order.
pub type BooleanXYZ = [bool; 3];

pub const ZERO_XYZ: VectorXYZ = [0.0; 3];

/// Component-wise sum of two vectors of the same length.
pub fn add_vectors<const N: usize>(a: [f64; N], b: [f64; N]) -> [f64; N] {
    let mut out = a;
    for (value, other) in out.iter_mut().zip(b) {
        *value += other;
    }
    out
}

/// Largest absolute value in `values`, or `0.0` when empty.
pub fn abs_max(values: &[f64]) -> f64 {
    values.iter().map(|value| value.abs()).fold(0.0, f64::max)
}

/// Arithmetic mean of `values`.
///
/// # Panics
/// Panics when `values` is empty. Callers only average buffers they have
/// just filled, so an empty slice is a bug in the caller.
pub fn average(values: &[f64]) -> f64 {
    assert!(!values.is_empty(), "average of an empty sample set");
    values.iter().sum::<f64>() / values.len() as f64
}

/// Clamps `value` into `[min, max]`.
///
/// Unlike [`f64::clamp`] this does not panic when `min > max`; `max` wins.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Applies `f` to every component.
pub fn map_xyz(vector: VectorXYZ, f: impl Fn(f64) -> f64) -> VectorXYZ {
    [f(vector[0]), f(vector[1]), f(vector[2])]
}
