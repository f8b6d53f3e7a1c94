use crate::device::soften_mouse_delta;
use crate::drag::MousePan;
use crate::rotation::{GestureRotation, RotationGesture};
use panwheel_core::{clamp, ListenerId};
use panwheel_gestures::{ListenerOptions, WheelEventData, WheelTarget};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Scale, translation and rotation (radians) of the canvas inside its wrapper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasView {
    pub scale: f64,
    pub translate: [f64; 2],
    pub rotation: f64,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: [0.0, 0.0],
            rotation: 0.0,
        }
    }
}

/// Coordinate conversions owned by the host's canvas widget.
///
/// Relative coordinates are fractions of the wrapper or canvas size, so
/// `[0.5, 0.5]` is the center.
pub trait CanvasTransform {
    /// Client coordinates to wrapper-relative coordinates.
    fn relative_wrapper_coordinates(&self, client: [f64; 2]) -> [f64; 2];

    /// Client coordinates to canvas-relative coordinates under `view`.
    fn normalize_matrix_coordinates(&self, view: &CanvasView, client: [f64; 2]) -> [f64; 2];

    /// Translation that puts `canvas_position` under `wrapper_position` at
    /// `new_scale`. `rotation` overrides the canvas rotation when given.
    fn projection_translate(
        &self,
        new_scale: f64,
        wrapper_position: [f64; 2],
        canvas_position: [f64; 2],
        rotation: Option<f64>,
    ) -> [f64; 2];

    /// `view` turned to the absolute `rotation` about `canvas_position`, with
    /// that canvas point left where it was on screen.
    fn rotate_canvas(
        &self,
        view: &CanvasView,
        canvas_position: [f64; 2],
        rotation: f64,
    ) -> CanvasView;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasError {
    InvalidScaleRange { min: f64, max: f64 },
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanvasError::InvalidScaleRange { min, max } => {
                write!(f, "invalid scale range {min}..={max}")
            }
        }
    }
}

impl std::error::Error for CanvasError {}

/// What a wheel event did to the view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WheelOutcome {
    Panned { by: [f64; 2] },
    Zoomed { from: f64, to: f64 },
}

/// Applies wheel, mouse drag and rotate gesture input to a [`CanvasView`].
///
/// Plain wheel input pans; wheel input with ctrl held (which is also how
/// trackpad pinches arrive) zooms about the pointer.
pub struct WheelPanZoom<T> {
    transform: T,
    view: CanvasView,
    min_scale: f64,
    max_scale: f64,
    drag: MousePan,
    rotation: GestureRotation,
}

impl<T: CanvasTransform> WheelPanZoom<T> {
    pub fn new(transform: T, min_scale: f64, max_scale: f64) -> Result<Self, CanvasError> {
        if !(min_scale > 0.0 && min_scale <= max_scale && max_scale.is_finite()) {
            return Err(CanvasError::InvalidScaleRange {
                min: min_scale,
                max: max_scale,
            });
        }
        Ok(Self {
            transform,
            view: CanvasView::default(),
            min_scale,
            max_scale,
            drag: MousePan::new(),
            rotation: GestureRotation::default(),
        })
    }

    pub fn view(&self) -> CanvasView {
        self.view
    }

    /// Replaces the view; the scale is clamped into range.
    pub fn set_view(&mut self, view: CanvasView) {
        self.view = CanvasView {
            scale: clamp(view.scale, self.min_scale, self.max_scale),
            ..view
        };
    }

    pub fn scale_range(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Pans or zooms for `event` and marks it default-prevented.
    ///
    /// Zooming anchors at the event's client position; events without one
    /// zoom about the client origin.
    pub fn handle_wheel(&mut self, event: &WheelEventData) -> WheelOutcome {
        let delta_x = soften_mouse_delta(event.delta_x);
        let delta_y = soften_mouse_delta(event.delta_y);

        let outcome = if event.ctrl_key {
            let current = self.view.scale;
            let scale_delta = -delta_y / 100.0 * current;
            let new_scale = clamp(current + scale_delta, self.min_scale, self.max_scale);

            let client = event.client_position.unwrap_or_default();
            let wrapper_position = self.transform.relative_wrapper_coordinates(client);
            let canvas_position = self
                .transform
                .normalize_matrix_coordinates(&self.view, client);
            let translate = self.transform.projection_translate(
                new_scale,
                wrapper_position,
                canvas_position,
                None,
            );

            self.view = CanvasView {
                scale: new_scale,
                translate,
                ..self.view
            };
            log::trace!("wheel zoom {current} -> {new_scale} at {client:?}");
            WheelOutcome::Zoomed {
                from: current,
                to: new_scale,
            }
        } else {
            let [x, y] = self.view.translate;
            self.view.translate = [x - delta_x, y - delta_y];
            WheelOutcome::Panned {
                by: [-delta_x, -delta_y],
            }
        };

        event.prevent_default();
        outcome
    }

    /// Mouse button pressed at `client`: starts dragging the canvas.
    pub fn mouse_down(&mut self, client: [f64; 2]) {
        self.drag.press(client, self.view.translate);
    }

    /// Pointer moved to `client`. Returns whether the view was dragged.
    pub fn mouse_move(&mut self, client: [f64; 2]) -> bool {
        match self.drag.drag_to(client) {
            Some(translate) => {
                self.view.translate = translate;
                true
            }
            None => false,
        }
    }

    pub fn mouse_up(&mut self) {
        self.drag.release();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn rotation_enabled(&self) -> bool {
        self.rotation.is_enabled()
    }

    pub fn set_rotation_enabled(&mut self, enabled: bool) {
        self.rotation.set_enabled(enabled);
    }

    /// A rotate gesture began; later readings are relative to the current rotation.
    pub fn gesture_start(&mut self) {
        self.rotation.start(self.view.rotation);
    }

    /// Rotates about the gesture's client position through
    /// [`CanvasTransform::rotate_canvas`]. Returns whether the view changed.
    pub fn gesture_change(&mut self, gesture: &RotationGesture) -> bool {
        let Some(rotation) = self.rotation.target_rotation(gesture) else {
            return false;
        };
        let canvas_position = self
            .transform
            .normalize_matrix_coordinates(&self.view, gesture.client_position);
        let rotated = self
            .transform
            .rotate_canvas(&self.view, canvas_position, rotation);
        log::trace!("gesture rotate to {rotation} rad about {canvas_position:?}");
        self.view = CanvasView {
            scale: self.view.scale,
            ..rotated
        };
        true
    }
}

impl<T: CanvasTransform + 'static> WheelPanZoom<T> {
    /// Routes every wheel event of `target` into `controller`.
    pub fn attach(controller: &Rc<RefCell<Self>>, target: &dyn WheelTarget) -> ListenerId {
        let controller = Rc::downgrade(controller);
        target.add_wheel_listener(
            Rc::new(move |event: &WheelEventData| {
                if let Some(controller) = controller.upgrade() {
                    controller.borrow_mut().handle_wheel(event);
                }
            }),
            ListenerOptions { passive: false },
        )
    }
}

impl<T> fmt::Debug for WheelPanZoom<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WheelPanZoom")
            .field("view", &self.view)
            .field("min_scale", &self.min_scale)
            .field("max_scale", &self.max_scale)
            .field("drag", &self.drag)
            .field("rotation", &self.rotation)
            .finish()
    }
}
