//! Feeds event streams into an engine on a virtual clock and records what
//! it publishes.

use panwheel_core::{TimerQueue, VectorXYZ};
use panwheel_gestures::{WheelEventData, WheelEventState, WheelGestures, WheelGesturesOptions};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Engine plus manual timer queue plus a log of every published state.
///
/// Time is moved forward by the gap between consecutive event time stamps
/// before each feed, so end-of-gesture timers fire exactly where they would
/// have during the recorded session.
pub struct GestureRecorder {
    gestures: WheelGestures,
    timers: Rc<TimerQueue>,
    states: Rc<RefCell<Vec<WheelEventState>>>,
    prev_time_stamp: f64,
}

impl Default for GestureRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecorder {
    /// Recorder with sign reversal disabled, so published deltas match the input.
    pub fn new() -> Self {
        Self::with_options(WheelGesturesOptions::new().reverse_sign(false))
    }

    pub fn with_options(options: WheelGesturesOptions) -> Self {
        let timers = Rc::new(TimerQueue::manual());
        let gestures = WheelGestures::with_scheduler(timers.clone(), options);
        let states = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&states);
        gestures.on_wheel(move |state| sink.borrow_mut().push(state.clone()));
        Self {
            gestures,
            timers,
            states,
            prev_time_stamp: 0.0,
        }
    }

    pub fn gestures(&self) -> &WheelGestures {
        &self.gestures
    }

    pub fn timers(&self) -> &Rc<TimerQueue> {
        &self.timers
    }

    /// Feeds `events`, then runs the timers that are pending afterwards
    /// (normally the end-of-gesture timer).
    pub fn feed_events(&mut self, events: &[WheelEventData]) {
        self.feed_events_with(events, |_, _| {});
    }

    /// Like [`Self::feed_events`], calling `before_feed` with each event and
    /// its index right before it is fed.
    pub fn feed_events_with(
        &mut self,
        events: &[WheelEventData],
        mut before_feed: impl FnMut(&WheelEventData, usize),
    ) {
        self.feed_events_pending(events, &mut before_feed);
        self.timers.run_only_pending();
    }

    /// Feeds `events` without flushing timers afterwards.
    pub fn feed_events_pending(
        &mut self,
        events: &[WheelEventData],
        mut before_feed: impl FnMut(&WheelEventData, usize),
    ) {
        for (index, event) in events.iter().enumerate() {
            if self.prev_time_stamp != 0.0 {
                let gap = event.time_stamp - self.prev_time_stamp;
                self.timers.advance_by(gap);
            }
            before_feed(event, index);
            self.gestures.feed_wheel(event.clone());
            self.prev_time_stamp = event.time_stamp;
        }
    }

    /// Every state published so far.
    pub fn states(&self) -> Vec<WheelEventState> {
        self.states.borrow().clone()
    }

    pub fn take_states(&self) -> Vec<WheelEventState> {
        std::mem::take(&mut *self.states.borrow_mut())
    }

    pub fn endings(&self) -> Vec<WheelEventState> {
        self.states
            .borrow()
            .iter()
            .filter(|state| state.is_ending)
            .cloned()
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelType {
    User,
    Momentum,
}

/// One user-driven or momentum stretch of a recorded stream.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseRange {
    pub wheel_type: WheelType,
    /// Indices of the first and last input event of the stretch.
    pub range: [usize; 2],
    pub is_start: bool,
    pub is_momentum: bool,
    pub is_ending: bool,
    pub is_momentum_cancel: bool,
    pub has_previous: bool,
    pub axis_delta: VectorXYZ,
    pub axis_velocity: VectorXYZ,
    pub axis_movement: VectorXYZ,
}

#[derive(Default)]
struct PhaseTracker {
    user_start: Option<usize>,
    momentum_start: Option<usize>,
    phases: Vec<PhaseRange>,
}

impl PhaseTracker {
    fn observe(&mut self, state: &WheelEventState, event_index: usize) {
        let wheel_type = if state.is_momentum {
            WheelType::Momentum
        } else {
            WheelType::User
        };
        let start = match wheel_type {
            WheelType::User => &mut self.user_start,
            WheelType::Momentum => &mut self.momentum_start,
        };

        if state.is_ending || state.is_momentum_cancel {
            if let Some(first) = start.take() {
                self.phases.push(PhaseRange {
                    wheel_type,
                    range: [first, event_index],
                    is_start: state.is_start,
                    is_momentum: state.is_momentum,
                    is_ending: state.is_ending,
                    is_momentum_cancel: state.is_momentum_cancel,
                    has_previous: state.previous.is_some(),
                    axis_delta: state.axis_delta,
                    axis_velocity: state.axis_velocity,
                    axis_movement: state.axis_movement,
                });
            }
        } else if (state.is_start || state.is_momentum) && start.is_none() {
            *start = Some(event_index);
        }
    }
}

/// Feeds `events` through a fresh [`GestureRecorder`] and summarizes the
/// stretches that ended, in the order they ended.
pub fn record_phases(events: &[WheelEventData]) -> Vec<PhaseRange> {
    let mut recorder = GestureRecorder::new();
    let event_index = Rc::new(Cell::new(None::<usize>));
    let tracker = Rc::new(RefCell::new(PhaseTracker::default()));

    let index = Rc::clone(&event_index);
    let sink = Rc::clone(&tracker);
    recorder.gestures().on_wheel(move |state| {
        if let Some(index) = index.get() {
            sink.borrow_mut().observe(state, index);
        }
    });

    recorder.feed_events_with(events, |_, index| event_index.set(Some(index)));
    let phases = std::mem::take(&mut tracker.borrow_mut().phases);
    phases
}
