//! Attaching the engine's intake to wheel event sources.
//!
//! A host's widget tree (or anything else that produces wheel input)
//! implements [`WheelTarget`]. [`WheelEventTarget`] is a ready-made in-process
//! source. [`TargetObserver`] binds one intake function to any number of
//! targets and keeps track of what it attached so it can detach again.

use crate::event::WheelEventData;
use panwheel_core::ListenerId;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

pub type WheelListener = Rc<dyn Fn(&WheelEventData)>;

/// Detaches one observed target when called. Calling it after the target was
/// already detached, or after the observer is gone, does nothing.
pub type Unobserve = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Passive listeners cannot suppress the event's default action.
    pub passive: bool,
}

/// A source of wheel events.
pub trait WheelTarget {
    fn add_wheel_listener(&self, listener: WheelListener, options: ListenerOptions) -> ListenerId;

    /// Returns false when `id` is not registered.
    fn remove_wheel_listener(&self, id: ListenerId) -> bool;
}

struct RegisteredListener {
    id: ListenerId,
    listener: WheelListener,
    options: ListenerOptions,
}

/// In-process wheel event source.
#[derive(Default)]
pub struct WheelEventTarget {
    listeners: RefCell<SmallVec<[Rc<RegisteredListener>; 2]>>,
    next_id: Cell<u64>,
}

impl WheelEventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// Returns true when a non-passive listener prevented the default action.
    pub fn dispatch(&self, event: &WheelEventData) -> bool {
        let snapshot = self.listeners.borrow().clone();
        for registered in snapshot {
            if registered.options.passive {
                (registered.listener)(&event.detached());
            } else {
                (registered.listener)(event);
            }
        }
        event.is_default_prevented()
    }
}

impl WheelTarget for WheelEventTarget {
    fn add_wheel_listener(&self, listener: WheelListener, options: ListenerOptions) -> ListenerId {
        let id = ListenerId::from_raw(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        let registered = RegisteredListener {
            id,
            listener,
            options,
        };
        self.listeners.borrow_mut().push(Rc::new(registered));
        id
    }

    fn remove_wheel_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|registered| registered.id != id);
        before != listeners.len()
    }
}

struct ObservedTarget {
    target: Rc<dyn WheelTarget>,
    listener: ListenerId,
}

type ObservedTargets = RefCell<Vec<ObservedTarget>>;

/// Binds one intake function to many wheel targets.
pub struct TargetObserver {
    intake: WheelListener,
    targets: Rc<ObservedTargets>,
}

impl TargetObserver {
    pub fn new(intake: WheelListener) -> Self {
        Self {
            intake,
            targets: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Registers the intake on `target` as a non-passive listener.
    ///
    /// Observing a target twice keeps the single existing registration.
    #[must_use = "call the returned closure to stop observing"]
    pub fn observe(&self, target: Rc<dyn WheelTarget>) -> Unobserve {
        let already_observed = self
            .targets
            .borrow()
            .iter()
            .any(|observed| same_target(&observed.target, &target));

        if already_observed {
            log::debug!("wheel target already observed");
        } else {
            let options = ListenerOptions { passive: false };
            let listener = target.add_wheel_listener(Rc::clone(&self.intake), options);
            self.targets.borrow_mut().push(ObservedTarget {
                target: Rc::clone(&target),
                listener,
            });
        }

        let targets: Weak<ObservedTargets> = Rc::downgrade(&self.targets);
        Box::new(move || {
            if let Some(targets) = targets.upgrade() {
                detach(&targets, &target);
            }
        })
    }

    /// Returns false when `target` was not observed.
    pub fn unobserve(&self, target: &Rc<dyn WheelTarget>) -> bool {
        detach(&self.targets, target)
    }

    /// Detaches every observed target.
    pub fn disconnect(&self) {
        let observed = std::mem::take(&mut *self.targets.borrow_mut());
        for ObservedTarget { target, listener } in observed {
            target.remove_wheel_listener(listener);
        }
    }

    pub fn observed_count(&self) -> usize {
        self.targets.borrow().len()
    }
}

fn same_target(a: &Rc<dyn WheelTarget>, b: &Rc<dyn WheelTarget>) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

fn detach(targets: &ObservedTargets, target: &Rc<dyn WheelTarget>) -> bool {
    let removed = {
        let mut targets = targets.borrow_mut();
        targets
            .iter()
            .position(|observed| same_target(&observed.target, target))
            .map(|index| targets.remove(index))
    };
    match removed {
        Some(observed) => {
            observed.target.remove_wheel_listener(observed.listener);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_intake() -> (Rc<Cell<usize>>, WheelListener) {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let intake = move |_: &WheelEventData| counter.set(counter.get() + 1);
        (count, Rc::new(intake))
    }

    #[test]
    fn passive_listener_cannot_prevent_default() {
        let target = WheelEventTarget::new();
        target.add_wheel_listener(
            Rc::new(|event: &WheelEventData| event.prevent_default()),
            ListenerOptions { passive: true },
        );
        assert!(!target.dispatch(&WheelEventData::pixels(0.0, 1.0, 0.0)));
    }

    #[test]
    fn active_listener_prevents_default() {
        let target = WheelEventTarget::new();
        target.add_wheel_listener(
            Rc::new(|event: &WheelEventData| event.prevent_default()),
            ListenerOptions::default(),
        );
        let event = WheelEventData::pixels(0.0, 1.0, 0.0);
        assert!(target.dispatch(&event));
        assert!(event.is_default_prevented());
    }

    #[test]
    fn observe_then_unobserve() {
        let (count, intake) = counting_intake();
        let observer = TargetObserver::new(intake);
        let target = Rc::new(WheelEventTarget::new());
        let dyn_target: Rc<dyn WheelTarget> = target.clone();

        let _unobserve = observer.observe(Rc::clone(&dyn_target));
        target.dispatch(&WheelEventData::pixels(0.0, 1.0, 0.0));
        assert_eq!(count.get(), 1);

        assert!(observer.unobserve(&dyn_target));
        target.dispatch(&WheelEventData::pixels(0.0, 1.0, 0.0));
        assert_eq!(count.get(), 1);
        assert_eq!(target.listener_count(), 0);
    }

    #[test]
    fn unobserve_unknown_target_is_a_no_op() {
        let (_, intake) = counting_intake();
        let observer = TargetObserver::new(intake);
        let target: Rc<dyn WheelTarget> = Rc::new(WheelEventTarget::new());
        assert!(!observer.unobserve(&target));
    }

    #[test]
    fn observing_twice_registers_once() {
        let (count, intake) = counting_intake();
        let observer = TargetObserver::new(intake);
        let target = Rc::new(WheelEventTarget::new());

        let _first = observer.observe(target.clone());
        let _second = observer.observe(target.clone());
        target.dispatch(&WheelEventData::pixels(0.0, 1.0, 0.0));

        assert_eq!(count.get(), 1);
        assert_eq!(observer.observed_count(), 1);
    }

    #[test]
    fn returned_closure_detaches() {
        let (count, intake) = counting_intake();
        let observer = TargetObserver::new(intake);
        let target = Rc::new(WheelEventTarget::new());

        let unobserve = observer.observe(target.clone());
        unobserve();
        target.dispatch(&WheelEventData::pixels(0.0, 1.0, 0.0));

        assert_eq!(count.get(), 0);
        assert_eq!(observer.observed_count(), 0);
    }

    #[test]
    fn disconnect_detaches_all_and_is_idempotent() {
        let (count, intake) = counting_intake();
        let observer = TargetObserver::new(intake);
        let a = Rc::new(WheelEventTarget::new());
        let b = Rc::new(WheelEventTarget::new());
        let _unobserve_a = observer.observe(a.clone());
        let _unobserve_b = observer.observe(b.clone());

        observer.disconnect();
        observer.disconnect();
        a.dispatch(&WheelEventData::pixels(0.0, 1.0, 0.0));
        b.dispatch(&WheelEventData::pixels(0.0, 1.0, 0.0));

        assert_eq!(count.get(), 0);
        assert_eq!(a.listener_count() + b.listener_count(), 0);
    }
}
