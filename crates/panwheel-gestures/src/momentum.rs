//! Classifies when a gesture turns into device-driven inertial momentum.
//!
//! Trackpad drivers keep emitting wheel events after the fingers leave the
//! pad, with a velocity that decays geometrically. While the user drives the
//! gesture the acceleration factor jumps around; once inertia takes over it
//! settles into a narrow band below one. Momentum is recognized when every
//! factor in the analysis window looks like that decay.

use crate::constants::{
    ACC_FACTOR_MAX, ACC_FACTOR_MIN, FINGER_LIFT_MIN_VELOCITY, WHEEL_EVENTS_TO_ANALYZE,
};
use crate::velocity::VelocityEstimator;
use panwheel_core::{abs_max, VectorXYZ};

#[derive(Clone, Debug, Default)]
pub struct MomentumDetector {
    finger_lift_pending: bool,
}

impl MomentumDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finger-lift event; it is consumed by the next [`Self::detect`].
    pub fn note_finger_lift(&mut self) {
        self.finger_lift_pending = true;
    }

    pub fn finger_lift_pending(&self) -> bool {
        self.finger_lift_pending
    }

    /// Runs after a merged point was produced. Returns true when momentum is
    /// recognized. Trims the estimator's factor history to the inspected window.
    pub fn detect(&mut self, estimator: &mut VelocityEstimator) -> bool {
        if std::mem::take(&mut self.finger_lift_pending)
            && abs_max(&estimator.axis_velocity()) >= FINGER_LIFT_MIN_VELOCITY
        {
            return true;
        }

        let factors = estimator.acceleration_factors();
        if factors.len() < WHEEL_EVENTS_TO_ANALYZE {
            return false;
        }

        let detected = factors
            .iter()
            .skip(factors.len() - WHEEL_EVENTS_TO_ANALYZE)
            .all(reads_as_momentum);

        estimator.retain_recent_factors(WHEEL_EVENTS_TO_ANALYZE);
        detected
    }
}

/// A single factor consistent with coasting: uniform decay, or every axis in band.
fn reads_as_momentum(factor: &VectorXYZ) -> bool {
    is_uniform_decay(factor) || factor.iter().all(|&f| in_momentum_range(f))
}

/// Every axis decelerates by the same factor, strictly between 0 and 1.
pub fn is_uniform_decay(factor: &VectorXYZ) -> bool {
    let first = factor[0];
    first > 0.0 && first < 1.0 && factor.iter().all(|&f| f == first)
}

/// Factor inside the tuned momentum band. Exactly zero counts as in range:
/// it is what a stationary axis reports while another axis carries the motion.
pub fn in_momentum_range(factor: f64) -> bool {
    if factor == 0.0 {
        return true;
    }
    (ACC_FACTOR_MIN..=ACC_FACTOR_MAX).contains(&factor)
}
