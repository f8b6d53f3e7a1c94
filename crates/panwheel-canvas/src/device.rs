//! Input device heuristics.

use panwheel_gestures::{DeltaMode, WheelEventData};

/// Delta sizes that classic mouse wheels report per notch.
pub const MOUSE_NOTCH_SIZES: [f64; 2] = [120.0, 100.0];

/// How much a notch is scaled down: one notch moves `notch / (100 / MOUSE_FACTOR)`.
pub const MOUSE_FACTOR: f64 = 4.0;

/// Best guess whether `event` came from a trackpad rather than a mouse wheel.
///
/// Browsers that report the legacy `wheelDeltaY` report exactly `-3 * deltaY`
/// for trackpads. Without it, pixel-mode deltas are taken to mean trackpad.
pub fn detect_trackpad(event: &WheelEventData) -> bool {
    match event.wheel_delta_y {
        Some(wheel_delta_y) if wheel_delta_y != 0.0 => wheel_delta_y == event.delta_y * -3.0,
        _ => event.delta_mode == DeltaMode::Pixel,
    }
}

/// Number of notches when `delta` is a whole multiple of a known notch size.
pub fn mouse_notches(delta: f64) -> Option<f64> {
    if delta == 0.0 || !delta.is_finite() {
        return None;
    }
    MOUSE_NOTCH_SIZES
        .iter()
        .find(|&&size| delta % size == 0.0)
        .map(|size| delta / size)
}

/// Shrinks mouse notch deltas to a pan distance comparable to trackpad
/// input: one step of `size / 25` in the delta's direction, however many
/// notches the event bundles. Anything that is not a notch multiple passes
/// through.
pub fn soften_mouse_delta(delta: f64) -> f64 {
    match mouse_notches(delta) {
        Some(notches) => delta / (100.0 / MOUSE_FACTOR * notches.abs()),
        None => delta,
    }
}
