//! Synthetic wheel event streams.

use panwheel_core::VectorXYZ;
use panwheel_gestures::{DeltaMode, WheelEventData};

/// Default spacing between generated events: one per 60Hz frame.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Even stream of events whose deltas sum to `delta_total` over `duration_ms`.
pub fn generate_events(delta_total: VectorXYZ, duration_ms: f64) -> Vec<WheelEventData> {
    generate_events_with(delta_total, duration_ms, FRAME_MS, DeltaMode::Pixel)
}

/// [`generate_events`] with explicit spacing and delta mode.
///
/// The first event is stamped one interval after zero; generation stops at
/// the last interval that still fits (rounded) into `duration_ms`.
pub fn generate_events_with(
    delta_total: VectorXYZ,
    duration_ms: f64,
    event_every_ms: f64,
    delta_mode: DeltaMode,
) -> Vec<WheelEventData> {
    let [delta_x, delta_y, delta_z] = delta_total.map(|d| d / duration_ms * event_every_ms);

    let mut events = Vec::new();
    let mut time_stamp = 0.0;
    while time_stamp < duration_ms && (time_stamp + event_every_ms).round() <= duration_ms {
        time_stamp += event_every_ms;
        let event = WheelEventData::new(delta_x, delta_y, delta_mode, time_stamp);
        events.push(event.with_delta_z(delta_z));
    }
    events
}

/// Shape of a trackpad swipe: the finger drives the content at a steady
/// rate, then the driver takes over and the deltas decay geometrically.
#[derive(Clone, Debug, PartialEq)]
pub struct SwipeTrace {
    /// Delta of every event while the finger is on the pad.
    pub drive_delta: VectorXYZ,
    pub drive_events: usize,
    /// Per-event ratio during inertia.
    pub decay: f64,
    pub momentum_events: usize,
    pub event_every_ms: f64,
    pub start_ms: f64,
}

impl Default for SwipeTrace {
    fn default() -> Self {
        Self {
            drive_delta: [0.0, 60.0, 0.0],
            drive_events: 6,
            decay: 0.9,
            momentum_events: 30,
            event_every_ms: 16.0,
            start_ms: 16.0,
        }
    }
}

impl SwipeTrace {
    pub fn new(drive_delta: VectorXYZ) -> Self {
        Self {
            drive_delta,
            ..Self::default()
        }
    }

    pub fn with_momentum_events(mut self, momentum_events: usize) -> Self {
        self.momentum_events = momentum_events;
        self
    }

    pub fn starting_at(mut self, start_ms: f64) -> Self {
        self.start_ms = start_ms;
        self
    }

    pub fn events(&self) -> Vec<WheelEventData> {
        let mut events = Vec::with_capacity(self.drive_events + self.momentum_events);
        let mut delta = self.drive_delta;
        for index in 0..self.drive_events + self.momentum_events {
            if index >= self.drive_events {
                delta = delta.map(|d| d * self.decay);
            }
            let time_stamp = self.start_ms + index as f64 * self.event_every_ms;
            events.push(
                WheelEventData::pixels(delta[0], delta[1], time_stamp).with_delta_z(delta[2]),
            );
        }
        events
    }

    /// Time stamp of the last generated event.
    pub fn end_ms(&self) -> f64 {
        let count = self.drive_events + self.momentum_events;
        self.start_ms + count.saturating_sub(1) as f64 * self.event_every_ms
    }
}

/// Decaying swipe along `drive_delta` with the default trace shape.
pub fn decaying_swipe(drive_delta: VectorXYZ) -> Vec<WheelEventData> {
    SwipeTrace::new(drive_delta).events()
}

/// The zero-delta event with a negative-zero x delta that Blink on Windows
/// precision touchpads sends when the fingers leave the pad.
pub fn finger_lift_event(time_stamp: f64) -> WheelEventData {
    WheelEventData::pixels(-0.0, 0.0, time_stamp)
}

/// Inserts a finger-lift event right after `events[index]`, one millisecond later.
pub fn insert_finger_lift(events: &mut Vec<WheelEventData>, index: usize) {
    let time_stamp = match events.get(index) {
        Some(event) => event.time_stamp + 1.0,
        None => 0.0,
    };
    let at = (index + 1).min(events.len());
    events.insert(at, finger_lift_event(time_stamp));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_stream_sums_to_total() {
        let events = generate_events([100.0, 500.0, 0.0], 1000.0);
        assert_eq!(events.len(), 60);
        let total_y: f64 = events.iter().map(|e| e.delta_y).sum();
        assert!((total_y - 500.0).abs() < 1e-6);
        assert!((events[0].time_stamp - FRAME_MS).abs() < 1e-9);
    }

    #[test]
    fn swipe_decays_after_drive_phase() {
        let trace = SwipeTrace::default();
        let events = trace.events();
        assert_eq!(events.len(), 36);
        assert_eq!(events[5].delta_y, 60.0);
        assert!((events[6].delta_y - 54.0).abs() < 1e-9);
        assert_eq!(events.last().map(|e| e.time_stamp), Some(trace.end_ms()));
    }

    #[test]
    fn finger_lift_lands_after_index() {
        let mut events = decaying_swipe([0.0, 60.0, 0.0]);
        insert_finger_lift(&mut events, 7);
        assert!(events[8].is_finger_lift());
        assert_eq!(events[8].time_stamp, events[7].time_stamp + 1.0);
    }
}
