//! Captures `log` records emitted on the current thread.
//!
//! The test harness runs tests on many threads at once. The logger is
//! installed process-wide but records into a thread-local buffer, so each
//! test only sees its own diagnostics.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedLog {
    pub level: Level,
    pub target: String,
    pub message: String,
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<CapturedLog>>> = const { RefCell::new(None) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let message = record.args().to_string();
        CAPTURED.with(|captured| {
            if let Some(logs) = captured.borrow_mut().as_mut() {
                logs.push(CapturedLog {
                    level: record.level(),
                    target: record.target().to_owned(),
                    message,
                });
            }
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

fn install() {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
}

/// Runs `f` and returns its result with every record logged on this thread meanwhile.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedLog>) {
    install();
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(Vec::new()));
    let result = f();
    let logs = CAPTURED.with(|captured| captured.borrow_mut().take().unwrap_or_default());
    (result, logs)
}

/// Records at exactly `level`.
pub fn at_level(logs: &[CapturedLog], level: Level) -> Vec<&CapturedLog> {
    logs.iter().filter(|log| log.level == level).collect()
}
