//! Tuning constants for wheel gesture recognition.
//!
//! These values are fitted against recorded trackpad and mouse traces.
//! Changing any of them changes which recorded swipes are classified as
//! momentum, so treat them as data rather than knobs.

/// Pixels per line for `DeltaMode::Line` events (16px font at 1.125 line height).
pub const LINE_HEIGHT: f64 = 16.0 * 1.125;

/// Viewport height assumed for `DeltaMode::Page` events until the host sets one.
pub const DEFAULT_PAGE_HEIGHT: f64 = 800.0;

/// Per-axis bound applied after normalization.
///
/// Some drivers emit single spikes of several thousand pixels; clamping keeps
/// them from dominating velocity and movement.
pub const DELTA_MAX_ABS: f64 = 700.0;

/// Number of raw deltas summed into one merged scroll point.
pub const WHEEL_EVENTS_TO_MERGE: usize = 2;

/// Number of acceleration factors inspected when looking for momentum.
pub const WHEEL_EVENTS_TO_ANALYZE: usize = 5;

/// Lower bound of the acceleration factor band that reads as inertial decay.
pub const ACC_FACTOR_MIN: f64 = 0.6;

/// Upper bound of the acceleration factor band that reads as inertial decay.
pub const ACC_FACTOR_MAX: f64 = 0.96;

/// End-of-gesture timeout before any velocity is known.
///
/// Long enough that old mice, which emit wheel events rarely, still produce
/// one continuous gesture.
pub const WILL_END_TIMEOUT_DEFAULT: f64 = 400.0;

pub const WILL_END_TIMEOUT_MIN: f64 = 100.0;
pub const WILL_END_TIMEOUT_MAX: f64 = 1000.0;

/// Peak axis speed (px/ms) at which a finger-lift event alone marks momentum.
pub const FINGER_LIFT_MIN_VELOCITY: f64 = 0.2;

/// Smallest delta that can cancel momentum, regardless of the previous delta.
pub const MOMENTUM_CANCEL_MIN_DELTA: f64 = 2.0;

/// Per-tick velocity decay used for movement projection.
pub const PROJECTION_DECAY: f64 = 0.996;
