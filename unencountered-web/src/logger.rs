//! `log` backend writing to the browser console.
//!
//! Native builds (unit tests, tooling) fall back to stderr.

use log::{Level, LevelFilter, Log, Metadata, Record};

static LOGGER: ConsoleLogger = ConsoleLogger;

pub struct ConsoleLogger;

/// Single-line rendering shared by the console and stderr sinks.
#[must_use]
pub fn format_record(level: Level, target: &str, message: &str) -> String {
    format!("[{level}] {target}: {message}")
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record.level(), record.target(), &record.args().to_string());
        emit(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{line}");
}

/// Install the console logger. Later calls only adjust the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn records_carry_level_and_target() {
        assert_eq!(
            format_record(Level::Warn, "unencountered_web::app", "storage unavailable"),
            "[WARN] unencountered_web::app: storage unavailable"
        );
    }

    #[test]
    fn init_twice_keeps_the_latest_level() {
        init(LevelFilter::Info);
        init(LevelFilter::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        assert!(ConsoleLogger.enabled(&Metadata::builder().level(Level::Debug).build()));
        assert!(!ConsoleLogger.enabled(&Metadata::builder().level(Level::Trace).build()));
    }
}
