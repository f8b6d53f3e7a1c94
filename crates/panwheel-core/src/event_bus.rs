//! Keyed, synchronous publish/subscribe.
//!
//! Listeners are stored per key and invoked in subscription order. Dispatch
//! works on a snapshot of the listener list, so a listener may subscribe or
//! unsubscribe (itself included) while it is being called.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::{Rc, Weak};

pub type Listener<D> = Rc<dyn Fn(&D)>;

/// Token identifying one registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Builds an id from a raw counter value, for registries outside this crate.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

type ListenerList<D> = SmallVec<[(ListenerId, Listener<D>); 2]>;

struct BusState<K, D> {
    listeners: FxHashMap<K, ListenerList<D>>,
    next_id: u64,
}

/// In-process event bus keyed by `K`, carrying payloads of type `D`.
///
/// Cloning the bus yields another handle to the same listener registry.
pub struct EventBus<K, D> {
    state: Rc<RefCell<BusState<K, D>>>,
}

impl<K, D> Clone for EventBus<K, D> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<K, D> Default for EventBus<K, D>
where
    K: Eq + Hash + Clone + 'static,
    D: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, D> EventBus<K, D>
where
    K: Eq + Hash + Clone + 'static,
    D: 'static,
{
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BusState {
                listeners: FxHashMap::default(),
                next_id: 0,
            })),
        }
    }

    /// Registers `listener` for `key`. The returned subscription can be used
    /// to remove it again; dropping the subscription keeps the listener.
    pub fn on(&self, key: K, listener: impl Fn(&D) + 'static) -> Subscription<K, D> {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state
            .listeners
            .entry(key.clone())
            .or_default()
            .push((id, Rc::new(listener)));
        Subscription {
            key,
            id,
            bus: Rc::downgrade(&self.state),
        }
    }

    /// Removes the listener `id` from `key`. Returns false if it was not registered.
    pub fn off(&self, key: &K, id: ListenerId) -> bool {
        remove_listener(&self.state, key, id)
    }

    /// Calls every listener registered for `key` with `data`.
    ///
    /// Dispatching to a key without listeners is a no-op.
    pub fn dispatch(&self, key: &K, data: &D) {
        let snapshot: ListenerList<D> = match self.state.borrow().listeners.get(key) {
            Some(listeners) => listeners.clone(),
            None => return,
        };
        for (_, listener) in snapshot {
            listener(data);
        }
    }

    pub fn listener_count(&self, key: &K) -> usize {
        self.state
            .borrow()
            .listeners
            .get(key)
            .map_or(0, |listeners| listeners.len())
    }
}

fn remove_listener<K, D>(state: &RefCell<BusState<K, D>>, key: &K, id: ListenerId) -> bool
where
    K: Eq + Hash,
{
    let mut state = state.borrow_mut();
    let Some(listeners) = state.listeners.get_mut(key) else {
        return false;
    };
    let before = listeners.len();
    listeners.retain(|(existing, _)| *existing != id);
    before != listeners.len()
}

/// Handle returned by [`EventBus::on`].
///
/// Holds only a weak reference to the bus; unsubscribing after the bus is
/// gone does nothing.
pub struct Subscription<K, D> {
    key: K,
    id: ListenerId,
    bus: Weak<RefCell<BusState<K, D>>>,
}

impl<K, D> Subscription<K, D>
where
    K: Eq + Hash,
{
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Removes the listener. Returns false if it had already been removed.
    pub fn unsubscribe(self) -> bool {
        match self.bus.upgrade() {
            Some(state) => remove_listener(&state, &self.key, self.id),
            None => false,
        }
    }
}

impl<K: std::fmt::Debug, D> std::fmt::Debug for Subscription<K, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    enum Topic {
        Wheel,
        Other,
    }

    #[test]
    fn dispatches_in_subscription_order() {
        let bus: EventBus<Topic, i32> = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            bus.on(Topic::Wheel, move |value: &i32| {
                log.borrow_mut().push(format!("{tag}{value}"))
            });
        }

        bus.dispatch(&Topic::Wheel, &1);
        assert_eq!(*log.borrow(), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn unknown_key_is_a_no_op() {
        let bus: EventBus<Topic, i32> = EventBus::new();
        bus.on(Topic::Wheel, |_| panic!("wrong key"));
        bus.dispatch(&Topic::Other, &3);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus: EventBus<Topic, i32> = EventBus::new();
        let calls = Rc::new(Cell::new(0));

        let counter = Rc::clone(&calls);
        let subscription = bus.on(Topic::Wheel, move |_| counter.set(counter.get() + 1));
        bus.dispatch(&Topic::Wheel, &0);
        assert!(subscription.unsubscribe());
        bus.dispatch(&Topic::Wheel, &0);

        assert_eq!(calls.get(), 1);
        assert_eq!(bus.listener_count(&Topic::Wheel), 0);
    }

    #[test]
    fn off_by_id_removes_only_that_listener() {
        let bus: EventBus<Topic, i32> = EventBus::new();
        let first = bus.on(Topic::Wheel, |_| {});
        let _second = bus.on(Topic::Wheel, |_| {});

        assert!(bus.off(&Topic::Wheel, first.id()));
        assert!(!bus.off(&Topic::Wheel, first.id()));
        assert_eq!(bus.listener_count(&Topic::Wheel), 1);
    }

    #[test]
    fn listener_may_unsubscribe_during_dispatch() {
        let bus: EventBus<Topic, i32> = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<ListenerId>>> = Rc::new(RefCell::new(None));

        let handle = bus.clone();
        let counter = Rc::clone(&calls);
        let own_id = Rc::clone(&slot);
        let subscription = bus.on(Topic::Wheel, move |_| {
            counter.set(counter.get() + 1);
            if let Some(id) = own_id.borrow_mut().take() {
                handle.off(&Topic::Wheel, id);
            }
        });
        *slot.borrow_mut() = Some(subscription.id());

        bus.dispatch(&Topic::Wheel, &0);
        bus.dispatch(&Topic::Wheel, &0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unsubscribe_after_bus_dropped_is_harmless() {
        let bus: EventBus<Topic, i32> = EventBus::new();
        let subscription = bus.on(Topic::Wheel, |_| {});
        drop(bus);
        assert!(!subscription.unsubscribe());
    }
}
