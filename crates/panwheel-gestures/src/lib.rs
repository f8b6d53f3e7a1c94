//! Wheel and trackpad gesture recognition
//!
//! Raw wheel events are noisy and inconsistent across devices: mice send
//! coarse notches, trackpads send dense pixel deltas and keep sending them
//! after the fingers lift. [`WheelGestures`] normalizes that input,
//! estimates velocity online, recognizes device-driven momentum and
//! publishes one [`WheelEventState`] per step of a gesture.

pub mod constants;
mod event;
mod momentum;
mod normalizer;
mod observer;
mod options;
mod projection;
mod state;
mod velocity;
mod wheel_gestures;

pub use event::{Axis, DeltaMode, WheelEventData, WheelEventState};
pub use momentum::{in_momentum_range, is_uniform_decay, MomentumDetector};
pub use normalizer::{
    clamp_axis_delta, delta_mode_unit, normalize, normalize_wheel, reverse_axis_delta_sign,
    NormalizedWheel,
};
pub use observer::{
    ListenerOptions, TargetObserver, Unobserve, WheelEventTarget, WheelListener, WheelTarget,
};
pub use options::{
    OptionsError, PreventWheelAction, ReverseSign, Setting, WheelGesturesConfig,
    WheelGesturesOptions, CONFIG_DEFAULTS,
};
pub use projection::{project_velocity, projection};
pub use velocity::{
    next_will_end_timeout, MergedScrollPoint, ScrollPoint, VelocityEstimator, VelocityUpdate,
};
pub use wheel_gestures::{GestureBus, GestureEventKind, GestureSubscription, WheelGestures};

pub mod prelude {
    pub use crate::event::{Axis, DeltaMode, WheelEventData, WheelEventState};
    pub use crate::options::{PreventWheelAction, ReverseSign, WheelGesturesOptions};
    pub use crate::wheel_gestures::{GestureEventKind, WheelGestures};
}
