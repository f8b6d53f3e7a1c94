//! Shared building blocks for panwheel
//!
//! This crate holds the pieces that the gesture engine and the canvas
//! controller both lean on: fixed-size vector helpers, a keyed
//! publish/subscribe bus, and timer scheduling with cancellable handles.

mod event_bus;
mod scheduler;
mod vector;

pub use event_bus::*;
pub use scheduler::*;
pub use vector::*;

pub mod prelude {
    pub use crate::event_bus::{EventBus, ListenerId, Subscription};
    pub use crate::scheduler::{DebounceTimer, Scheduler, TimeSource, TimerId, TimerQueue};
    pub use crate::vector::{BooleanXYZ, VectorXYZ};
}
