//! One-shot timer scheduling.
//!
//! The gesture engine needs exactly one kind of asynchrony: a debounced
//! "nothing happened for a while" callback. Hosts plug their own event loop
//! in through [`Scheduler`]; [`TimerQueue`] is the in-crate implementation,
//! driven either by a virtual clock (tests, replays) or by the monotonic
//! system clock polled from the host loop.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;
use web_time::Instant;

/// Identifier of a scheduled callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Source of time and one-shot callbacks.
pub trait Scheduler {
    /// Current time in milliseconds on this scheduler's clock.
    fn now_ms(&self) -> f64;

    /// Runs `callback` once, `delay_ms` from now.
    fn schedule(&self, delay_ms: f64, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancels a pending callback. Returns false if it already ran or was cancelled.
    fn cancel(&self, id: TimerId) -> bool;

    fn is_pending(&self, id: TimerId) -> bool;
}

/// Where a [`TimerQueue`] reads the current time from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeSource {
    /// Virtual clock that only moves when the queue is advanced.
    Manual,
    /// Monotonic wall clock, measured from queue creation.
    System,
}

struct PendingTimer {
    id: TimerId,
    due_ms: f64,
    callback: Box<dyn FnOnce()>,
}

impl PendingTimer {
    /// Due order, then scheduling order.
    fn runs_before(&self, other: &PendingTimer) -> Ordering {
        self.due_ms
            .total_cmp(&other.due_ms)
            .then(self.id.cmp(&other.id))
    }
}

struct QueueState {
    source: TimeSource,
    origin: Instant,
    manual_now_ms: f64,
    timers: Vec<PendingTimer>,
    next_id: u64,
}

impl QueueState {
    fn now_ms(&self) -> f64 {
        match self.source {
            TimeSource::Manual => self.manual_now_ms,
            TimeSource::System => self.origin.elapsed().as_secs_f64() * 1000.0,
        }
    }

    /// Index of the earliest timer accepted by `filter`; ties break on scheduling order.
    fn earliest(&self, filter: impl Fn(&PendingTimer) -> bool) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|&(_, timer)| filter(timer))
            .min_by(|(_, a), (_, b)| a.runs_before(b))
            .map(|(index, _)| index)
    }
}

/// Single-threaded timer queue.
///
/// Callbacks run outside of the queue's internal borrow, so they are free to
/// schedule or cancel timers on the same queue.
pub struct TimerQueue {
    state: RefCell<QueueState>,
}

impl TimerQueue {
    pub fn new(source: TimeSource) -> Self {
        Self {
            state: RefCell::new(QueueState {
                source,
                origin: Instant::now(),
                manual_now_ms: 0.0,
                timers: Vec::new(),
                next_id: 0,
            }),
        }
    }

    pub fn manual() -> Self {
        Self::new(TimeSource::Manual)
    }

    pub fn system() -> Self {
        Self::new(TimeSource::System)
    }

    pub fn source(&self) -> TimeSource {
        self.state.borrow().source
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Due time of the next pending callback, useful for hosts that sleep until then.
    pub fn next_due_ms(&self) -> Option<f64> {
        let state = self.state.borrow();
        let index = state.earliest(|_| true)?;
        Some(state.timers[index].due_ms)
    }

    /// Moves the virtual clock forward by `ms`, running every callback that
    /// falls due on the way, in due order. Returns how many ran.
    ///
    /// On a system-clock queue the clock cannot be moved; this runs whatever
    /// is due now instead.
    pub fn advance_by(&self, ms: f64) -> usize {
        if self.source() == TimeSource::System {
            log::warn!("advance_by({ms}) ignored by a system clock queue");
            return self.run_due();
        }

        let target = self.state.borrow().manual_now_ms + ms.max(0.0);
        let mut ran = 0;
        while let Some(timer) = self.pop_earliest(|timer| timer.due_ms <= target) {
            (timer.callback)();
            ran += 1;
        }
        self.state.borrow_mut().manual_now_ms = target;
        ran
    }

    /// Runs the callbacks that are pending right now, moving the virtual clock
    /// to each one's due time. Callbacks scheduled by those callbacks stay queued.
    pub fn run_only_pending(&self) -> usize {
        let snapshot: Vec<TimerId> = self.state.borrow().timers.iter().map(|t| t.id).collect();
        let mut ran = 0;
        while let Some(timer) = self.pop_earliest(|timer| snapshot.contains(&timer.id)) {
            (timer.callback)();
            ran += 1;
        }
        ran
    }

    /// Runs callbacks until the queue is empty, including ones scheduled along the way.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while let Some(timer) = self.pop_earliest(|_| true) {
            (timer.callback)();
            ran += 1;
        }
        ran
    }

    /// Runs every callback whose due time has been reached on the current clock.
    pub fn run_due(&self) -> usize {
        let mut ran = 0;
        loop {
            let now = self.now_ms();
            let Some(timer) = self.pop_earliest(|timer| timer.due_ms <= now) else {
                break;
            };
            (timer.callback)();
            ran += 1;
        }
        ran
    }

    fn pop_earliest(&self, filter: impl Fn(&PendingTimer) -> bool) -> Option<PendingTimer> {
        let mut state = self.state.borrow_mut();
        let index = state.earliest(filter)?;
        let timer = state.timers.remove(index);
        if state.source == TimeSource::Manual && timer.due_ms > state.manual_now_ms {
            state.manual_now_ms = timer.due_ms;
        }
        Some(timer)
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::manual()
    }
}

impl Scheduler for TimerQueue {
    fn now_ms(&self) -> f64 {
        self.state.borrow().now_ms()
    }

    fn schedule(&self, delay_ms: f64, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let due_ms = state.now_ms() + delay_ms.max(0.0);
        state.timers.push(PendingTimer {
            id,
            due_ms,
            callback,
        });
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.timers.len();
        state.timers.retain(|timer| timer.id != id);
        before != state.timers.len()
    }

    fn is_pending(&self, id: TimerId) -> bool {
        let state = self.state.borrow();
        state.timers.iter().any(|timer| timer.id == id)
    }
}

/// Owned handle to a scheduled callback. Cancels it when dropped.
pub struct TimerRegistration {
    scheduler: Rc<dyn Scheduler>,
    id: Option<TimerId>,
}

impl TimerRegistration {
    pub fn schedule(
        scheduler: Rc<dyn Scheduler>,
        delay_ms: f64,
        callback: impl FnOnce() + 'static,
    ) -> Self {
        let id = scheduler.schedule(delay_ms, Box::new(callback));
        Self {
            scheduler,
            id: Some(id),
        }
    }

    pub fn id(&self) -> Option<TimerId> {
        self.id
    }

    pub fn is_pending(&self) -> bool {
        self.id.is_some_and(|id| self.scheduler.is_pending(id))
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl Drop for TimerRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.cancel(id);
        }
    }
}

/// Holds at most one pending callback; scheduling a new one cancels the old.
pub struct DebounceTimer {
    scheduler: Rc<dyn Scheduler>,
    pending: Option<TimerRegistration>,
}

impl DebounceTimer {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            pending: None,
        }
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn reschedule(&mut self, delay_ms: f64, callback: impl FnOnce() + 'static) {
        self.cancel();
        self.pending = Some(TimerRegistration::schedule(
            Rc::clone(&self.scheduler),
            delay_ms,
            callback,
        ));
    }

    pub fn cancel(&mut self) {
        if let Some(registration) = self.pending.take() {
            registration.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(TimerRegistration::is_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    type TagLog = Rc<RefCell<Vec<&'static str>>>;

    fn recorder() -> (TagLog, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |tag: &'static str| -> Box<dyn FnOnce()> {
            let sink = Rc::clone(&sink);
            Box::new(move || sink.borrow_mut().push(tag))
        };
        (log, make)
    }

    #[test]
    fn advance_runs_due_timers_in_order() {
        let queue = TimerQueue::manual();
        let (log, make) = recorder();

        queue.schedule(30.0, make("late"));
        queue.schedule(10.0, make("early"));
        queue.schedule(100.0, make("never"));

        assert_eq!(queue.advance_by(50.0), 2);
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(queue.now_ms(), 50.0);
        assert_eq!(queue.pending_count(), 1);
    }

    #[test]
    fn cancel_prevents_callback() {
        let queue = TimerQueue::manual();
        let (log, make) = recorder();

        let id = queue.schedule(10.0, make("cancelled"));
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        queue.advance_by(20.0);

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn run_only_pending_leaves_newly_scheduled_timers() {
        let queue = Rc::new(TimerQueue::manual());
        let fired = Rc::new(Cell::new(0));

        let chained = Rc::clone(&queue);
        let counter = Rc::clone(&fired);
        queue.schedule(
            5.0,
            Box::new(move || {
                counter.set(counter.get() + 1);
                let counter = Rc::clone(&counter);
                chained.schedule(5.0, Box::new(move || counter.set(counter.get() + 1)));
            }),
        );

        assert_eq!(queue.run_only_pending(), 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(queue.now_ms(), 5.0);
        assert_eq!(queue.pending_count(), 1);

        assert_eq!(queue.run_all(), 1);
        assert_eq!(fired.get(), 2);
        assert_eq!(queue.now_ms(), 10.0);
    }

    #[test]
    fn registration_cancels_on_drop() {
        let queue = Rc::new(TimerQueue::manual());
        let fired = Rc::new(Cell::new(false));

        let flag = Rc::clone(&fired);
        let registration = TimerRegistration::schedule(queue.clone(), 10.0, move || flag.set(true));
        assert!(registration.is_pending());
        drop(registration);
        queue.advance_by(20.0);

        assert!(!fired.get());
    }

    #[test]
    fn debounce_keeps_only_the_latest_callback() {
        let queue = Rc::new(TimerQueue::manual());
        let mut debounce = DebounceTimer::new(queue.clone());
        let (log, make) = recorder();

        debounce.reschedule(100.0, make("first"));
        queue.advance_by(50.0);
        debounce.reschedule(100.0, make("second"));
        queue.advance_by(60.0);
        assert!(log.borrow().is_empty());
        assert!(debounce.is_pending());

        queue.advance_by(40.0);
        assert_eq!(*log.borrow(), vec!["second"]);
        assert!(!debounce.is_pending());
    }

    #[test]
    fn debounce_cancel_is_idempotent() {
        let queue = Rc::new(TimerQueue::manual());
        let mut debounce = DebounceTimer::new(queue.clone());
        debounce.reschedule(10.0, || {});
        debounce.cancel();
        debounce.cancel();
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn system_queue_runs_zero_delay_timers() {
        let queue = TimerQueue::system();
        let (log, make) = recorder();
        queue.schedule(0.0, make("now"));
        assert_eq!(queue.run_due(), 1);
        assert_eq!(*log.borrow(), vec!["now"]);
    }
}
