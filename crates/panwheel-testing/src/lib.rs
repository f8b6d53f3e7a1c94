//! Testing utilities and harness for panwheel

pub mod assertions;
pub mod generate;
pub mod log_capture;
pub mod recorder;

pub use assertions::*;
pub use generate::*;
pub use log_capture::{capture_logs, CapturedLog};
pub use recorder::*;

pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::generate::*;
    pub use crate::log_capture::{capture_logs, CapturedLog};
    pub use crate::recorder::*;
}
