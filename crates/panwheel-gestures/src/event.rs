//! Wheel input events and the gesture snapshots published for them.

use crate::projection::project_velocity;
use panwheel_core::{add_vectors, VectorXYZ};
use std::cell::Cell;
use std::rc::Rc;

/// Unit of the deltas carried by a wheel event.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DeltaMode {
    #[default]
    Pixel = 0,
    Line = 1,
    Page = 2,
}

impl DeltaMode {
    /// Maps the numeric mode reported by platforms (0, 1, 2).
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(DeltaMode::Pixel),
            1 => Some(DeltaMode::Line),
            2 => Some(DeltaMode::Page),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Raw wheel input as delivered by the platform.
///
/// Clones share the default-prevented flag, so a host can keep a copy of the
/// event it fed and check afterwards whether the engine suppressed it.
#[derive(Clone, Debug)]
pub struct WheelEventData {
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub delta_mode: DeltaMode,
    /// Milliseconds on the platform's event clock.
    pub time_stamp: f64,
    /// Pointer position in client coordinates, when the platform reports one.
    pub client_position: Option<[f64; 2]>,
    pub ctrl_key: bool,
    /// Legacy `wheelDeltaY`, reported by some browsers alongside `delta_y`.
    pub wheel_delta_y: Option<f64>,
    default_prevented: Rc<Cell<bool>>,
}

impl WheelEventData {
    pub fn new(delta_x: f64, delta_y: f64, delta_mode: DeltaMode, time_stamp: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            delta_z: 0.0,
            delta_mode,
            time_stamp,
            client_position: None,
            ctrl_key: false,
            wheel_delta_y: None,
            default_prevented: Rc::new(Cell::new(false)),
        }
    }

    /// Pixel-mode event.
    pub fn pixels(delta_x: f64, delta_y: f64, time_stamp: f64) -> Self {
        Self::new(delta_x, delta_y, DeltaMode::Pixel, time_stamp)
    }

    pub fn with_delta_z(mut self, delta_z: f64) -> Self {
        self.delta_z = delta_z;
        self
    }

    pub fn with_client_position(mut self, x: f64, y: f64) -> Self {
        self.client_position = Some([x, y]);
        self
    }

    pub fn with_ctrl_key(mut self, ctrl_key: bool) -> Self {
        self.ctrl_key = ctrl_key;
        self
    }

    pub fn with_wheel_delta_y(mut self, wheel_delta_y: f64) -> Self {
        self.wheel_delta_y = Some(wheel_delta_y);
        self
    }

    pub fn deltas(&self) -> VectorXYZ {
        [self.delta_x, self.delta_y, self.delta_z]
    }

    /// Suppresses the platform's default action (page scroll, browser zoom).
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Copy of this event with its own default-prevented flag.
    ///
    /// Passive listeners receive such a copy so they cannot suppress anything.
    pub fn detached(&self) -> Self {
        Self {
            default_prevented: Rc::new(Cell::new(false)),
            ..self.clone()
        }
    }

    /// Zero-magnitude event whose x delta is negative zero.
    ///
    /// Blink on Windows precision touchpads sends one when the fingers leave
    /// the pad while the content is still moving.
    pub fn is_finger_lift(&self) -> bool {
        self.delta_x == 0.0
            && self.delta_x.is_sign_negative()
            && self.delta_y == 0.0
            && self.delta_z == 0.0
    }
}

/// Snapshot published for every step of a wheel gesture.
#[derive(Clone, Debug)]
pub struct WheelEventState {
    /// First snapshot of the gesture.
    pub is_start: bool,
    pub is_momentum: bool,
    /// Final snapshot of the gesture.
    pub is_ending: bool,
    /// The gesture ended because new input interrupted momentum.
    pub is_momentum_cancel: bool,
    /// Normalized delta of this step; zero on ending snapshots.
    pub axis_delta: VectorXYZ,
    /// px/ms per axis.
    pub axis_velocity: VectorXYZ,
    /// Sum of all deltas since the gesture started.
    pub axis_movement: VectorXYZ,
    /// The raw event that produced this step (for endings: the last one fed).
    pub event: Rc<WheelEventData>,
    /// The snapshot emitted just before this one within the same gesture.
    ///
    /// The previous snapshot never carries its own `previous`, so at most one
    /// older snapshot is kept alive.
    pub previous: Option<Rc<WheelEventState>>,
}

impl WheelEventState {
    /// Movement plus the projected remaining momentum travel, per axis.
    ///
    /// Computed on each call from the values frozen in this snapshot.
    pub fn axis_movement_projection(&self) -> VectorXYZ {
        add_vectors(self.axis_movement, project_velocity(self.axis_velocity))
    }
}
