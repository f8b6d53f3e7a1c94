//! Momentum travel projection.

use crate::constants::PROJECTION_DECAY;
use panwheel_core::{map_xyz, VectorXYZ};

/// Total further travel for `velocity_px_ms` if velocity shrinks by `decay`
/// every tick: the sum of the geometric series `v*d + v*d^2 + ...`.
///
/// Advisory only; detection never reads it.
pub fn projection(velocity_px_ms: f64, decay: f64) -> f64 {
    velocity_px_ms * decay / (1.0 - decay)
}

/// [`projection`] with the default decay, per axis.
pub fn project_velocity(velocity: VectorXYZ) -> VectorXYZ {
    map_xyz(velocity, |v| projection(v, PROJECTION_DECAY))
}
