//! Rotation from platform rotate gestures (Safari's `gesturestart` and
//! `gesturechange`), which report the total angle since the gesture began.

/// One `gesturechange` reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationGesture {
    /// Degrees rotated since the gesture started, clockwise positive.
    pub rotation_degrees: f64,
    pub client_position: [f64; 2],
}

impl RotationGesture {
    pub fn new(rotation_degrees: f64, client_x: f64, client_y: f64) -> Self {
        Self {
            rotation_degrees,
            client_position: [client_x, client_y],
        }
    }
}

/// Turns gesture readings into absolute canvas rotations in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureRotation {
    enabled: bool,
    start_rotation: f64,
}

impl Default for GestureRotation {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GestureRotation {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            start_rotation: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Remembers the canvas rotation (radians) the gesture is relative to.
    pub fn start(&mut self, current_rotation: f64) {
        self.start_rotation = current_rotation;
    }

    /// Absolute rotation for `gesture`, or `None` when rotation is disabled
    /// or the gesture has not turned at all.
    pub fn target_rotation(&self, gesture: &RotationGesture) -> Option<f64> {
        if !self.enabled || gesture.rotation_degrees == 0.0 {
            return None;
        }
        Some(self.start_rotation + gesture.rotation_degrees.to_radians())
    }
}
