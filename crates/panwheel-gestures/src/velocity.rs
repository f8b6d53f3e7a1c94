//! Online velocity estimation for wheel deltas.
//!
//! Wheel events arrive at irregular intervals and individual deltas are
//! noisy. The estimator sums a small batch of deltas into one merged point,
//! derives velocity between consecutive merged points and keeps the ratio of
//! successive velocities (the acceleration factor) for momentum detection.
//! It also adapts the end-of-gesture timeout to the observed event rate.

use crate::constants::{
    WHEEL_EVENTS_TO_ANALYZE, WHEEL_EVENTS_TO_MERGE, WILL_END_TIMEOUT_DEFAULT, WILL_END_TIMEOUT_MAX,
    WILL_END_TIMEOUT_MIN,
};
use panwheel_core::{add_vectors, average, map_xyz, VectorXYZ, ZERO_XYZ};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// One normalized delta waiting to be merged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollPoint {
    pub axis_delta: VectorXYZ,
    pub time_stamp: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergedScrollPoint {
    pub axis_delta_sum: VectorXYZ,
    pub time_stamp: f64,
}

/// What a call to [`VelocityEstimator::push`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VelocityUpdate {
    /// Buffered; no merged point yet, velocity estimated from the single delta.
    Provisional,
    /// Buffered until the batch is full.
    Buffered,
    /// A merged point was produced. `velocity_updated` is false when there was
    /// no earlier merged point or the time delta was not positive.
    Merged { velocity_updated: bool },
}

impl VelocityUpdate {
    pub fn merged(self) -> bool {
        matches!(self, VelocityUpdate::Merged { .. })
    }
}

#[derive(Clone, Debug)]
pub struct VelocityEstimator {
    to_merge: SmallVec<[ScrollPoint; WHEEL_EVENTS_TO_MERGE]>,
    latest_merged: Option<MergedScrollPoint>,
    axis_velocity: VectorXYZ,
    acceleration_factors: VecDeque<VectorXYZ>,
    will_end_timeout: f64,
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityEstimator {
    pub fn new() -> Self {
        Self {
            to_merge: SmallVec::new(),
            latest_merged: None,
            axis_velocity: ZERO_XYZ,
            acceleration_factors: VecDeque::with_capacity(WHEEL_EVENTS_TO_ANALYZE + 1),
            will_end_timeout: WILL_END_TIMEOUT_DEFAULT,
        }
    }

    /// Current velocity in px/ms per axis.
    pub fn axis_velocity(&self) -> VectorXYZ {
        self.axis_velocity
    }

    /// Milliseconds without input after which the gesture is considered over.
    pub fn will_end_timeout(&self) -> f64 {
        self.will_end_timeout
    }

    /// Most recent acceleration factors, oldest first. Never longer than
    /// [`WHEEL_EVENTS_TO_ANALYZE`].
    pub fn acceleration_factors(&self) -> &VecDeque<VectorXYZ> {
        &self.acceleration_factors
    }

    /// Drops all but the newest `len` acceleration factors.
    pub fn retain_recent_factors(&mut self, len: usize) {
        while self.acceleration_factors.len() > len {
            self.acceleration_factors.pop_front();
        }
    }

    pub fn latest_merged(&self) -> Option<&MergedScrollPoint> {
        self.latest_merged.as_ref()
    }

    /// Adds one delta. `is_momentum` selects the timeout policy.
    pub fn push(&mut self, point: ScrollPoint, is_momentum: bool) -> VelocityUpdate {
        self.to_merge.push(point);

        if self.to_merge.len() < WHEEL_EVENTS_TO_MERGE {
            if self.latest_merged.is_some() {
                return VelocityUpdate::Buffered;
            }
            // no merged point yet: the raw delta spread over the current
            // timeout gives early feedback on sparse input
            let timeout = self.will_end_timeout;
            self.axis_velocity = map_xyz(point.axis_delta, |delta| delta / timeout);
            return VelocityUpdate::Provisional;
        }

        let timestamps: SmallVec<[f64; WHEEL_EVENTS_TO_MERGE]> =
            self.to_merge.iter().map(|p| p.time_stamp).collect();
        let merged = MergedScrollPoint {
            axis_delta_sum: self
                .to_merge
                .iter()
                .fold(ZERO_XYZ, |sum, p| add_vectors(sum, p.axis_delta)),
            time_stamp: average(&timestamps),
        };
        self.to_merge.clear();

        let previous = self.latest_merged.replace(merged);
        let velocity_updated = match previous {
            Some(previous) => self.update_velocity(&merged, &previous, is_momentum),
            None => false,
        };
        VelocityUpdate::Merged { velocity_updated }
    }

    fn update_velocity(
        &mut self,
        latest: &MergedScrollPoint,
        previous: &MergedScrollPoint,
        is_momentum: bool,
    ) -> bool {
        let delta_time = latest.time_stamp - previous.time_stamp;
        if delta_time <= 0.0 || delta_time.is_nan() {
            log::warn!(
                "invalid deltaTime {delta_time}ms between merged points, velocity not updated"
            );
            return false;
        }

        let velocity = map_xyz(latest.axis_delta_sum, |delta| delta / delta_time);
        let mut factor = ZERO_XYZ;
        for (axis, value) in factor.iter_mut().enumerate() {
            let previous_velocity = self.axis_velocity[axis];
            // a stationary axis divides by one instead of zero
            let divisor = if previous_velocity == 0.0 || previous_velocity.is_nan() {
                1.0
            } else {
                previous_velocity
            };
            *value = velocity[axis] / divisor;
        }

        self.axis_velocity = velocity;
        self.acceleration_factors.push_back(factor);
        self.retain_recent_factors(WHEEL_EVENTS_TO_ANALYZE);
        self.will_end_timeout = next_will_end_timeout(delta_time, is_momentum);
        true
    }
}

/// Timeout derived from the interval between merged points: rounded up to
/// 10ms, padded by 20%, doubled while momentum is unknown, kept within
/// `[WILL_END_TIMEOUT_MIN, WILL_END_TIMEOUT_MAX]`.
pub fn next_will_end_timeout(delta_time: f64, is_momentum: bool) -> f64 {
    let padded = (delta_time / 10.0).ceil() * 10.0 * 1.2;
    let scaled = if is_momentum { padded } else { padded * 2.0 };
    scaled
        .max(WILL_END_TIMEOUT_MIN)
        .round()
        .min(WILL_END_TIMEOUT_MAX)
}
