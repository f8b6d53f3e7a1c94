//! The wheel gesture engine.
//!
//! [`WheelGestures`] turns a stream of raw wheel events into gesture
//! snapshots. Each event is processed to completion before the next one is
//! looked at; the only deferred work is the debounced end-of-gesture timer.
//!
//! Listener callbacks run after the engine has released its internal state,
//! so a listener may feed more events, change options or subscribe and
//! unsubscribe while it is being called.

use crate::constants::DEFAULT_PAGE_HEIGHT;
use crate::event::{WheelEventData, WheelEventState};
use crate::normalizer::normalize;
use crate::observer::{TargetObserver, Unobserve, WheelListener, WheelTarget};
use crate::options::{OptionsError, PreventWheelAction, WheelGesturesConfig, WheelGesturesOptions};
use crate::state::GestureState;
use crate::velocity::ScrollPoint;
use panwheel_core::{
    abs_max, add_vectors, DebounceTimer, EventBus, ListenerId, Scheduler, Subscription,
    TimerQueue, VectorXYZ, ZERO_XYZ,
};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Topics published by [`WheelGestures`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureEventKind {
    /// Every gesture snapshot: start, move, momentum and ending.
    Wheel,
}

pub type GestureBus = EventBus<GestureEventKind, WheelEventState>;
pub type GestureSubscription = Subscription<GestureEventKind, WheelEventState>;

/// Snapshots produced while processing one input; at most an ending plus a start.
type Emitted = SmallVec<[WheelEventState; 2]>;

struct Inner {
    config: WheelGesturesConfig,
    page_height: f64,
    state: GestureState,
    /// Last event that moved the gesture; ending snapshots refer to it.
    current_event: Option<Rc<WheelEventData>>,
    /// Last published snapshot, kept without its own `previous`.
    previous_state: Option<Rc<WheelEventState>>,
    end_timer: DebounceTimer,
    bus: GestureBus,
    self_ref: Weak<RefCell<Inner>>,
    disposed: bool,
}

impl Inner {
    fn process(&mut self, event: WheelEventData, emitted: &mut Emitted) {
        let wheel = normalize(&event, self.config.reverse_sign, self.page_height);
        let axis_delta = wheel.axis_delta;
        let delta_max_abs = abs_max(&axis_delta);

        if self.should_prevent_default(delta_max_abs, &axis_delta) {
            event.prevent_default();
        }

        let finger_lift = event.is_finger_lift();

        if !self.state.is_started {
            if finger_lift {
                log::trace!("finger-lift event without an active gesture ignored");
                return;
            }
            self.start();
        } else if self.state.cancels_momentum(delta_max_abs) {
            log::debug!(
                "momentum cancelled by delta {delta_max_abs} (last {})",
                self.state.last_abs_delta
            );
            self.end(true, emitted);
            self.start();
        }

        if finger_lift {
            // zero delta must not reach the velocity estimate
            self.state.detector.note_finger_lift();
            return;
        }

        let event = Rc::new(event);
        self.current_event = Some(Rc::clone(&event));

        let state = &mut self.state;
        state.axis_movement = add_vectors(state.axis_movement, axis_delta);
        state.last_abs_delta = delta_max_abs;

        let update = state.estimator.push(
            ScrollPoint {
                axis_delta,
                time_stamp: wheel.time_stamp,
            },
            state.is_momentum,
        );
        if update.merged() && !state.is_momentum && state.detector.detect(&mut state.estimator) {
            state.is_momentum = true;
            log::debug!(
                "momentum recognized, velocity {:?}",
                state.estimator.axis_velocity()
            );
        }

        let is_start = !self.state.is_start_published;
        emitted.push(self.publish(event, axis_delta, is_start, false, false));
        self.state.is_start_published = true;

        self.schedule_end();
    }

    fn should_prevent_default(&self, delta_max_abs: f64, axis_delta: &VectorXYZ) -> bool {
        match &self.config.prevent_wheel_action {
            PreventWheelAction::Enabled(enabled) => *enabled,
            PreventWheelAction::Axis(axis) => axis_delta[axis.index()].abs() >= delta_max_abs,
            PreventWheelAction::Unsupported(token) => {
                log::warn!("unsupported preventWheelAction value: {token}");
                false
            }
        }
    }

    fn publish(
        &mut self,
        event: Rc<WheelEventData>,
        axis_delta: VectorXYZ,
        is_start: bool,
        is_ending: bool,
        is_momentum_cancel: bool,
    ) -> WheelEventState {
        let snapshot = WheelEventState {
            is_start,
            is_momentum: self.state.is_momentum,
            is_ending,
            is_momentum_cancel,
            axis_delta,
            axis_velocity: self.state.estimator.axis_velocity(),
            axis_movement: self.state.axis_movement,
            event,
            previous: None,
        };
        let previous = self.previous_state.replace(Rc::new(snapshot.clone()));
        WheelEventState {
            previous,
            ..snapshot
        }
    }

    fn start(&mut self) {
        let now = self.end_timer.scheduler().now_ms();
        self.state = GestureState::started(now);
        self.previous_state = None;
        log::trace!("wheel gesture started at {now}ms");
    }

    fn end(&mut self, momentum_cancel: bool, emitted: &mut Emitted) {
        if !self.state.is_started {
            return;
        }
        self.end_timer.cancel();

        if let Some(event) = self.current_event.clone() {
            let is_momentum_cancel = momentum_cancel && self.state.is_momentum;
            let ending = self.publish(event, ZERO_XYZ, false, true, is_momentum_cancel);
            emitted.push(ending);
        }

        log::trace!(
            "wheel gesture ended after {}ms, movement {:?}",
            self.end_timer.scheduler().now_ms() - self.state.start_time,
            self.state.axis_movement
        );
        self.state.is_momentum = false;
        self.state.is_started = false;
    }

    fn schedule_end(&mut self) {
        let timeout = self.state.estimator.will_end_timeout();
        let inner = self.self_ref.clone();
        self.end_timer.reschedule(timeout, move || {
            if let Some(inner) = inner.upgrade() {
                end_gesture(&inner);
            }
        });
    }
}

fn dispatch_all(bus: &GestureBus, emitted: Emitted) {
    for state in &emitted {
        bus.dispatch(&GestureEventKind::Wheel, state);
    }
}

fn feed(inner: &RefCell<Inner>, event: WheelEventData) {
    let (bus, emitted) = {
        let mut inner = inner.borrow_mut();
        if inner.disposed {
            return;
        }
        let mut emitted = Emitted::new();
        inner.process(event, &mut emitted);
        (inner.bus.clone(), emitted)
    };
    dispatch_all(&bus, emitted);
}

fn end_gesture(inner: &RefCell<Inner>) {
    let (bus, emitted) = {
        let mut inner = inner.borrow_mut();
        if inner.disposed {
            return;
        }
        let mut emitted = Emitted::new();
        inner.end(false, &mut emitted);
        (inner.bus.clone(), emitted)
    };
    dispatch_all(&bus, emitted);
}

/// Wheel gesture recognizer.
///
/// ```
/// use panwheel_gestures::{WheelEventData, WheelGestures, WheelGesturesOptions};
///
/// let gestures = WheelGestures::new(WheelGesturesOptions::new().reverse_sign(false));
/// gestures.on_wheel(|state| {
///     if state.is_start {
///         println!("gesture started, delta {:?}", state.axis_delta);
///     }
/// });
/// gestures.feed_wheel(WheelEventData::pixels(0.0, 20.0, 0.0));
/// assert!(gestures.is_started());
/// ```
pub struct WheelGestures {
    inner: Rc<RefCell<Inner>>,
    bus: GestureBus,
    observer: TargetObserver,
    timers: Option<Rc<TimerQueue>>,
}

impl WheelGestures {
    /// Engine driven by its own manual-clock [`TimerQueue`], reachable
    /// through [`Self::timer_queue`].
    pub fn new(options: WheelGesturesOptions) -> Self {
        let timers = Rc::new(TimerQueue::manual());
        let mut gestures = Self::with_scheduler(timers.clone(), options);
        gestures.timers = Some(timers);
        gestures
    }

    /// Engine whose end-of-gesture timer runs on `scheduler`.
    pub fn with_scheduler(scheduler: Rc<dyn Scheduler>, options: WheelGesturesOptions) -> Self {
        let bus = GestureBus::new();
        let inner = Rc::new_cyclic(|self_ref| {
            RefCell::new(Inner {
                config: WheelGesturesConfig::default(),
                page_height: DEFAULT_PAGE_HEIGHT,
                state: GestureState::idle(),
                current_event: None,
                previous_state: None,
                end_timer: DebounceTimer::new(scheduler),
                bus: bus.clone(),
                self_ref: self_ref.clone(),
                disposed: false,
            })
        });

        let intake_ref = Rc::downgrade(&inner);
        let intake: WheelListener = Rc::new(move |event: &WheelEventData| {
            if let Some(inner) = intake_ref.upgrade() {
                feed(&inner, event.clone());
            }
        });

        let gestures = Self {
            inner,
            bus,
            observer: TargetObserver::new(intake),
            timers: None,
        };
        gestures.update_options(options);
        gestures
    }

    /// The queue created by [`Self::new`]; `None` for engines built with
    /// [`Self::with_scheduler`].
    pub fn timer_queue(&self) -> Option<&Rc<TimerQueue>> {
        self.timers.as_ref()
    }

    /// Processes one event synchronously.
    ///
    /// The caller keeps its own clone of `event` to observe
    /// [`WheelEventData::is_default_prevented`] afterwards.
    pub fn feed_wheel(&self, event: WheelEventData) {
        feed(&self.inner, event);
    }

    /// Processes `events` in order, as if each were fed on its own.
    pub fn feed_wheel_batch(&self, events: &[WheelEventData]) {
        for event in events {
            feed(&self.inner, event.clone());
        }
    }

    #[must_use = "call the returned closure to stop observing"]
    pub fn observe(&self, target: Rc<dyn WheelTarget>) -> Unobserve {
        self.observer.observe(target)
    }

    pub fn unobserve(&self, target: &Rc<dyn WheelTarget>) -> bool {
        self.observer.unobserve(target)
    }

    pub fn disconnect(&self) {
        self.observer.disconnect();
    }

    pub fn on(
        &self,
        kind: GestureEventKind,
        listener: impl Fn(&WheelEventState) + 'static,
    ) -> GestureSubscription {
        self.bus.on(kind, listener)
    }

    /// Shorthand for `on(GestureEventKind::Wheel, listener)`.
    pub fn on_wheel(&self, listener: impl Fn(&WheelEventState) + 'static) -> GestureSubscription {
        self.on(GestureEventKind::Wheel, listener)
    }

    pub fn off(&self, kind: GestureEventKind, id: ListenerId) -> bool {
        self.bus.off(&kind, id)
    }

    /// Merges `options` over the current configuration and returns the
    /// effective configuration.
    ///
    /// An update with an explicitly null field is rejected as a whole: an
    /// error is logged and the current configuration is returned unchanged.
    pub fn update_options(&self, options: WheelGesturesOptions) -> WheelGesturesConfig {
        match self.try_update_options(options) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}");
                self.config()
            }
        }
    }

    /// Like [`Self::update_options`] but reports a rejected update to the caller
    /// instead of logging it.
    pub fn try_update_options(
        &self,
        options: WheelGesturesOptions,
    ) -> Result<WheelGesturesConfig, OptionsError> {
        let mut inner = self.inner.borrow_mut();
        let config = options.apply_to(&inner.config)?;
        inner.config = config.clone();
        Ok(config)
    }

    pub fn config(&self) -> WheelGesturesConfig {
        self.inner.borrow().config.clone()
    }

    /// Height in pixels of one page for page-mode deltas.
    pub fn set_viewport_height(&self, height: f64) {
        if height.is_finite() && height > 0.0 {
            self.inner.borrow_mut().page_height = height;
        } else {
            log::warn!("ignoring viewport height {height}");
        }
    }

    pub fn is_started(&self) -> bool {
        self.inner.borrow().state.is_started
    }

    pub fn is_momentum(&self) -> bool {
        self.inner.borrow().state.is_momentum
    }

    /// Current adaptive end-of-gesture timeout in milliseconds.
    pub fn will_end_timeout(&self) -> f64 {
        self.inner.borrow().state.estimator.will_end_timeout()
    }

    /// Detaches every target and cancels the pending end timer. Later feeds
    /// are ignored. Safe to call more than once.
    pub fn dispose(&self) {
        self.observer.disconnect();
        let mut inner = self.inner.borrow_mut();
        if !inner.disposed {
            log::trace!("wheel gestures disposed");
        }
        inner.disposed = true;
        inner.end_timer.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }
}

impl Default for WheelGestures {
    fn default() -> Self {
        Self::new(WheelGesturesOptions::new())
    }
}

impl Drop for WheelGestures {
    fn drop(&mut self) {
        if let Ok(inner) = self.inner.try_borrow() {
            if inner.disposed {
                return;
            }
        }
        self.observer.disconnect();
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.disposed = true;
            inner.end_timer.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WILL_END_TIMEOUT_DEFAULT;
    use crate::event::Axis;
    use std::cell::Cell;

    type StateLog = Rc<RefCell<Vec<WheelEventState>>>;

    fn engine() -> (WheelGestures, Rc<TimerQueue>, StateLog) {
        let gestures = WheelGestures::new(WheelGesturesOptions::new().reverse_sign(false));
        let timers = gestures.timer_queue().cloned().unwrap();
        let states = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&states);
        gestures.on_wheel(move |state| sink.borrow_mut().push(state.clone()));
        (gestures, timers, states)
    }

    #[test]
    fn first_event_starts_with_provisional_velocity() {
        let (gestures, _, states) = engine();
        gestures.feed_wheel(WheelEventData::pixels(0.0, 20.0, 0.0));

        let states = states.borrow();
        assert_eq!(states.len(), 1);
        assert!(states[0].is_start);
        assert!(states[0].previous.is_none());
        assert_eq!(states[0].axis_velocity[1], 20.0 / WILL_END_TIMEOUT_DEFAULT);
    }

    #[test]
    fn second_snapshot_links_to_the_first_only() {
        let (gestures, _, states) = engine();
        gestures.feed_wheel(WheelEventData::pixels(0.0, 20.0, 0.0));
        gestures.feed_wheel(WheelEventData::pixels(0.0, 20.0, 16.0));
        gestures.feed_wheel(WheelEventData::pixels(0.0, 20.0, 32.0));

        let states = states.borrow();
        assert!(!states[1].is_start);
        let previous = states[2].previous.as_ref().unwrap();
        assert_eq!(previous.axis_movement, [0.0, 40.0, 0.0]);
        assert!(previous.previous.is_none());
    }

    #[test]
    fn timeout_ends_gesture_once() {
        let (gestures, timers, states) = engine();
        gestures.feed_wheel(WheelEventData::pixels(0.0, 20.0, 0.0));
        assert_eq!(timers.pending_count(), 1);

        timers.advance_by(WILL_END_TIMEOUT_DEFAULT);
        timers.run_all();

        let states = states.borrow();
        assert_eq!(states.len(), 2);
        assert!(states[1].is_ending);
        assert_eq!(states[1].axis_delta, ZERO_XYZ);
        assert!(!gestures.is_started());
    }

    #[test]
    fn prevent_default_policy() {
        let (gestures, _, _) = engine();
        let event = WheelEventData::pixels(0.0, 20.0, 0.0);
        gestures.feed_wheel(event.clone());
        assert!(event.is_default_prevented());

        gestures.update_options(WheelGesturesOptions::new().prevent_wheel_action(Axis::X));
        let vertical = WheelEventData::pixels(1.0, 20.0, 16.0);
        gestures.feed_wheel(vertical.clone());
        assert!(!vertical.is_default_prevented());

        let horizontal = WheelEventData::pixels(20.0, 1.0, 32.0);
        gestures.feed_wheel(horizontal.clone());
        assert!(horizontal.is_default_prevented());
    }

    #[test]
    fn listener_may_feed_reentrantly() {
        let options = WheelGesturesOptions::new().reverse_sign(false);
        let gestures = Rc::new(WheelGestures::new(options));
        let seen = Rc::new(Cell::new(0));
        let weak = Rc::downgrade(&gestures);
        let counter = Rc::clone(&seen);
        gestures.on_wheel(move |state| {
            counter.set(counter.get() + 1);
            if state.is_start {
                if let Some(gestures) = weak.upgrade() {
                    gestures.feed_wheel(WheelEventData::pixels(0.0, 5.0, 8.0));
                }
            }
        });

        gestures.feed_wheel(WheelEventData::pixels(0.0, 5.0, 0.0));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn disposed_engine_ignores_input_and_timers() {
        let (gestures, timers, states) = engine();
        gestures.feed_wheel(WheelEventData::pixels(0.0, 20.0, 0.0));
        gestures.dispose();
        gestures.dispose();
        assert_eq!(timers.pending_count(), 0);

        gestures.feed_wheel(WheelEventData::pixels(0.0, 20.0, 16.0));
        timers.run_all();
        assert_eq!(states.borrow().len(), 1);
    }

    #[test]
    fn dropping_engine_cancels_timer() {
        let (gestures, timers, _) = engine();
        gestures.feed_wheel(WheelEventData::pixels(0.0, 20.0, 0.0));
        drop(gestures);
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(timers.run_all(), 0);
    }

    #[test]
    fn idle_finger_lift_does_not_start() {
        let (gestures, timers, states) = engine();
        gestures.feed_wheel(WheelEventData::pixels(-0.0, 0.0, 0.0));
        assert!(!gestures.is_started());
        assert!(states.borrow().is_empty());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn viewport_height_scales_page_deltas() {
        let (gestures, _, states) = engine();
        gestures.set_viewport_height(500.0);
        gestures.feed_wheel(WheelEventData::new(0.0, 1.0, crate::DeltaMode::Page, 0.0));
        assert_eq!(states.borrow()[0].axis_delta, [0.0, 500.0, 0.0]);
    }
}
