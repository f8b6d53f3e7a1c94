use crate::constants::MOMENTUM_CANCEL_MIN_DELTA;
use crate::momentum::MomentumDetector;
use crate::velocity::VelocityEstimator;
use panwheel_core::{VectorXYZ, ZERO_XYZ};

/// Mutable bookkeeping for the gesture in progress.
///
/// Replaced wholesale at every gesture start, so nothing leaks from one
/// gesture into the next.
#[derive(Clone, Debug)]
pub(crate) struct GestureState {
    pub is_started: bool,
    pub is_start_published: bool,
    pub is_momentum: bool,
    pub start_time: f64,
    /// Largest absolute axis delta of the most recent event.
    pub last_abs_delta: f64,
    pub axis_movement: VectorXYZ,
    pub estimator: VelocityEstimator,
    pub detector: MomentumDetector,
}

impl GestureState {
    pub fn idle() -> Self {
        Self {
            is_started: false,
            is_start_published: false,
            is_momentum: false,
            start_time: 0.0,
            last_abs_delta: f64::INFINITY,
            axis_movement: ZERO_XYZ,
            estimator: VelocityEstimator::new(),
            detector: MomentumDetector::new(),
        }
    }

    pub fn started(start_time: f64) -> Self {
        Self {
            is_started: true,
            start_time,
            ..Self::idle()
        }
    }

    /// A delta this large while momentum runs means the user took over again.
    pub fn cancels_momentum(&self, delta_max_abs: f64) -> bool {
        let threshold = MOMENTUM_CANCEL_MIN_DELTA.max(self.last_abs_delta * 2.0);
        self.is_momentum && delta_max_abs > threshold
    }
}

impl Default for GestureState {
    fn default() -> Self {
        Self::idle()
    }
}
