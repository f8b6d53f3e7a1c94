//! Converts raw wheel deltas into clamped pixel vectors.
//!
//! Pipeline: unit conversion, then sign reversal, then per-axis clamping.
//! Every step is a pure function of its inputs.

use crate::constants::{DELTA_MAX_ABS, LINE_HEIGHT};
use crate::event::{DeltaMode, WheelEventData};
use crate::options::ReverseSign;
use panwheel_core::{clamp, map_xyz, VectorXYZ};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedWheel {
    pub axis_delta: VectorXYZ,
    pub time_stamp: f64,
}

/// Pixels per unit of `mode`.
pub fn delta_mode_unit(mode: DeltaMode, page_height: f64) -> f64 {
    match mode {
        DeltaMode::Pixel => 1.0,
        DeltaMode::Line => LINE_HEIGHT,
        DeltaMode::Page => page_height,
    }
}

pub fn normalize_wheel(event: &WheelEventData, page_height: f64) -> NormalizedWheel {
    let unit = delta_mode_unit(event.delta_mode, page_height);
    NormalizedWheel {
        axis_delta: map_xyz(event.deltas(), |delta| delta * unit),
        time_stamp: event.time_stamp,
    }
}

pub fn reverse_axis_delta_sign(
    wheel: NormalizedWheel,
    reverse_sign: ReverseSign,
) -> NormalizedWheel {
    let Some(multipliers) = reverse_sign.multipliers() else {
        return wheel;
    };
    let mut axis_delta = wheel.axis_delta;
    for (delta, multiplier) in axis_delta.iter_mut().zip(multipliers) {
        *delta *= multiplier;
    }
    NormalizedWheel {
        axis_delta,
        ..wheel
    }
}

pub fn clamp_axis_delta(wheel: NormalizedWheel) -> NormalizedWheel {
    NormalizedWheel {
        axis_delta: map_xyz(wheel.axis_delta, clamp_delta),
        ..wheel
    }
}

fn clamp_delta(delta: f64) -> f64 {
    clamp(delta, -DELTA_MAX_ABS, DELTA_MAX_ABS)
}

/// Full normalization as applied by the engine.
pub fn normalize(
    event: &WheelEventData,
    reverse_sign: ReverseSign,
    page_height: f64,
) -> NormalizedWheel {
    let wheel = normalize_wheel(event, page_height);
    clamp_axis_delta(reverse_axis_delta_sign(wheel, reverse_sign))
}
