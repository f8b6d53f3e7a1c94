//! Wheel-driven pan and zoom for canvas widgets
//!
//! The coordinate math of the canvas (wrapper/canvas spaces, rotation,
//! projection) belongs to the host; this crate consumes it through
//! [`CanvasTransform`] and only decides what wheel, drag and rotate input
//! should do.

mod device;
mod drag;
mod pan_zoom;
mod rotation;

pub use device::*;
pub use drag::*;
pub use pan_zoom::*;
pub use rotation::*;
