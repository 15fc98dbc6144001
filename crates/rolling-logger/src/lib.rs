//! Rolling Logger
//!
//! A `log` backend for browser applications. Every record is forwarded to the
//! console and the most recent ones are kept in a fixed-size circular buffer,
//! so the UI can show what happened just before a failure.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Number of records kept when no explicit capacity is given
pub const DEFAULT_CAPACITY: usize = 256;

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

/// One formatted log record
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub timestamp: String,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogLine {
    pub fn format(&self, app_name: &str) -> String {
        format!(
            "[{}] {} {:<5} {}: {}",
            self.timestamp, app_name, self.level, self.target, self.message
        )
    }
}

/// Logger with a bounded in-memory history
pub struct RollingLogger {
    app_name: String,
    level: LevelFilter,
    capacity: usize,
    buffer: Mutex<VecDeque<LogLine>>,
}

impl RollingLogger {
    pub fn new(app_name: &str, level: LevelFilter, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            app_name: app_name.to_string(),
            level,
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Snapshot of the buffered records, oldest first
    pub fn recent(&self) -> Vec<LogLine> {
        match self.buffer.lock() {
            Ok(buffer) => buffer.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn push(&self, line: LogLine) {
        if let Ok(mut buffer) = self.buffer.lock() {
            if buffer.len() == self.capacity {
                buffer.pop_front();
            }
            buffer.push_back(line);
        }
    }

    fn emit(&self, line: &LogLine) {
        let text = line.format(&self.app_name);

        #[cfg(target_arch = "wasm32")]
        {
            let value = wasm_bindgen::JsValue::from_str(&text);
            match line.level {
                Level::Error => web_sys::console::error_1(&value),
                Level::Warn => web_sys::console::warn_1(&value),
                Level::Info => web_sys::console::info_1(&value),
                Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("{}", text);
    }
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = LogLine {
            timestamp: chrono::Local::now().format("%H:%M:%S%.3f").to_string(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        };
        self.emit(&line);
        self.push(line);
    }

    fn flush(&self) {}
}

/// Install the global logger. Fails if another logger is already installed.
pub fn init_logger(app_name: &str, level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| RollingLogger::new(app_name, level, DEFAULT_CAPACITY));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Buffered records of the global logger (empty before `init_logger`)
pub fn recent() -> Vec<LogLine> {
    LOGGER.get().map(RollingLogger::recent).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(logger: &RollingLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("test")
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn test_buffer_keeps_latest_records() {
        let logger = RollingLogger::new("Test", LevelFilter::Trace, 3);
        for i in 0..5 {
            record(&logger, Level::Info, &format!("line {}", i));
        }

        let lines: Vec<String> = logger.recent().into_iter().map(|l| l.message).collect();
        assert_eq!(lines, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_level_filter_drops_verbose_records() {
        let logger = RollingLogger::new("Test", LevelFilter::Warn, 10);
        record(&logger, Level::Debug, "noise");
        record(&logger, Level::Info, "still noise");
        record(&logger, Level::Error, "boom");

        let recent = logger.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].level, Level::Error);
        assert_eq!(recent[0].message, "boom");
    }

    #[test]
    fn test_zero_capacity_still_keeps_one() {
        let logger = RollingLogger::new("Test", LevelFilter::Info, 0);
        record(&logger, Level::Info, "a");
        record(&logger, Level::Info, "b");
        assert_eq!(logger.recent().len(), 1);
        assert_eq!(logger.recent()[0].message, "b");
    }

    #[test]
    fn test_format_includes_app_and_target() {
        let line = LogLine {
            timestamp: "10:00:00.000".to_string(),
            level: Level::Warn,
            target: "api".to_string(),
            message: "retrying".to_string(),
        };
        assert_eq!(line.format("SmartLife"), "[10:00:00.000] SmartLife WARN  api: retrying");
    }

    #[test]
    fn test_global_logger_installs_once() {
        // The only test that touches the global logger
        init_logger("Test", LevelFilter::Info).expect("first install succeeds");
        log::info!("hello from global");

        assert!(recent().iter().any(|l| l.message == "hello from global"));
        assert!(init_logger("Test", LevelFilter::Info).is_err());
    }
}
