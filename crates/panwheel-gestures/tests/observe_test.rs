//! Attaching engines to in-process wheel event sources.

use panwheel_gestures::{
    ListenerOptions, WheelEventData, WheelEventState, WheelEventTarget, WheelGestures,
    WheelGesturesOptions, WheelTarget,
};
use std::cell::RefCell;
use std::rc::Rc;

type StateLog = Rc<RefCell<Vec<WheelEventState>>>;

fn recording_engine() -> (WheelGestures, StateLog) {
    let gestures = WheelGestures::default();
    let states = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&states);
    gestures.on_wheel(move |state| sink.borrow_mut().push(state.clone()));
    (gestures, states)
}

#[test]
fn observed_target_feeds_the_engine() {
    let (gestures, states) = recording_engine();
    let target = Rc::new(WheelEventTarget::new());
    let _unobserve = gestures.observe(target.clone());

    let prevented = target.dispatch(&WheelEventData::pixels(0.0, 10.0, 0.0));

    assert!(prevented);
    let states = states.borrow();
    assert_eq!(states.len(), 1);
    let state = &states[0];
    assert!(state.is_start);
    assert!(!state.is_ending);
    assert!(!state.is_momentum);
    assert!(!state.is_momentum_cancel);
    assert_eq!(state.axis_delta, [-0.0, -10.0, 0.0]);
    assert_eq!(state.axis_movement, [0.0, -10.0, 0.0]);
    assert_eq!(state.axis_velocity, [0.0, -0.025, 0.0]);
    assert!(state.previous.is_none());
}

#[test]
fn unobserve_stops_intake() {
    let (gestures, states) = recording_engine();
    let target = Rc::new(WheelEventTarget::new());
    let dyn_target: Rc<dyn WheelTarget> = target.clone();
    let _unobserve = gestures.observe(Rc::clone(&dyn_target));

    target.dispatch(&WheelEventData::pixels(0.0, 10.0, 0.0));
    assert!(gestures.unobserve(&dyn_target));
    assert!(!gestures.unobserve(&dyn_target));
    target.dispatch(&WheelEventData::pixels(0.0, 10.0, 16.0));

    assert_eq!(states.borrow().len(), 1);
    assert_eq!(target.listener_count(), 0);
}

#[test]
fn unobserve_closure_detaches() {
    let (gestures, states) = recording_engine();
    let target = Rc::new(WheelEventTarget::new());
    let unobserve = gestures.observe(target.clone());
    unobserve();

    target.dispatch(&WheelEventData::pixels(0.0, 10.0, 0.0));
    assert!(states.borrow().is_empty());
}

#[test]
fn one_engine_many_targets() {
    let (gestures, states) = recording_engine();
    let a = Rc::new(WheelEventTarget::new());
    let b = Rc::new(WheelEventTarget::new());
    let _unobserve_a = gestures.observe(a.clone());
    let _unobserve_b = gestures.observe(b.clone());

    a.dispatch(&WheelEventData::pixels(0.0, 10.0, 0.0));
    b.dispatch(&WheelEventData::pixels(0.0, 10.0, 16.0));
    assert_eq!(states.borrow().len(), 2);

    gestures.disconnect();
    gestures.disconnect();
    a.dispatch(&WheelEventData::pixels(0.0, 10.0, 32.0));
    assert_eq!(states.borrow().len(), 2);
}

#[test]
fn passive_listener_next_to_engine_cannot_suppress() {
    let gestures = WheelGestures::new(WheelGesturesOptions::new().prevent_wheel_action(false));
    let target = Rc::new(WheelEventTarget::new());
    let _unobserve = gestures.observe(target.clone());
    target.add_wheel_listener(
        Rc::new(|event: &WheelEventData| event.prevent_default()),
        ListenerOptions { passive: true },
    );

    assert!(!target.dispatch(&WheelEventData::pixels(0.0, 10.0, 0.0)));
}

#[test]
fn dropping_engine_detaches_targets() {
    let target = Rc::new(WheelEventTarget::new());
    {
        let (gestures, _) = recording_engine();
        let _unobserve = gestures.observe(target.clone());
        assert_eq!(target.listener_count(), 1);
    }
    assert_eq!(target.listener_count(), 0);
    target.dispatch(&WheelEventData::pixels(0.0, 10.0, 0.0));
}

#[test]
fn batch_feed_matches_single_feeds() {
    let events: Vec<_> = (0..8)
        .map(f64::from)
        .map(|i| WheelEventData::pixels(1.0, 10.0 + i, 16.0 * i + 16.0))
        .collect();

    let (batched, batched_states) = recording_engine();
    batched.feed_wheel_batch(&events);

    let (single, single_states) = recording_engine();
    for event in &events {
        single.feed_wheel(event.clone());
    }

    let movement = |states: &StateLog| -> Vec<_> {
        let states = states.borrow();
        states.iter().map(|state| state.axis_movement).collect()
    };
    assert_eq!(movement(&batched_states), movement(&single_states));
    assert_eq!(batched_states.borrow().len(), events.len());
}

#[test]
fn off_and_unsubscribe_stop_delivery() {
    let gestures = WheelGestures::default();
    let count = Rc::new(RefCell::new(0));

    let first = Rc::clone(&count);
    let removed = gestures.on_wheel(move |_| *first.borrow_mut() += 1);
    let second = Rc::clone(&count);
    let unsubscribed = gestures.on_wheel(move |_| *second.borrow_mut() += 1);

    assert!(gestures.off(*removed.key(), removed.id()));
    assert!(unsubscribed.unsubscribe());

    gestures.feed_wheel(WheelEventData::pixels(0.0, 10.0, 0.0));
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn listeners_run_in_subscription_order() {
    let gestures = WheelGestures::default();
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = Rc::clone(&order);
        gestures.on_wheel(move |_| order.borrow_mut().push(tag));
    }
    gestures.feed_wheel(WheelEventData::pixels(0.0, 10.0, 0.0));
    assert_eq!(*order.borrow(), ["first", "second", "third"]);
}
