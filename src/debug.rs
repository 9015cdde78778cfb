//! Stderr bridge for the `log` facade.
//!
//! Controlled by the QUILL_DEBUG environment variable:
//! - 0 or unset: off
//! - 1: errors only
//! - 2: info (pipeline events)
//! - 3: debug (template frame transitions, fired guards)
//! - 4: trace (every emitted token)

use std::sync::OnceLock;

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;
static INIT: OnceLock<()> = OnceLock::new();

fn level_from_env() -> LevelFilter {
    match std::env::var("QUILL_DEBUG")
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
    {
        Some(1) => LevelFilter::Error,
        Some(2) => LevelFilter::Info,
        Some(3) => LevelFilter::Debug,
        Some(4) => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

/// Install the stderr logger once. Safe to call from every entry path;
/// later calls are no-ops, as is losing the `set_logger` race in tests.
pub fn init() {
    INIT.get_or_init(|| {
        let level = level_from_env();
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    });
}
