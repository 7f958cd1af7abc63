use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::time::SystemTime;

const RESET: &str = "\x1b[0m";
const BLUE: &str = "\x1b[34m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

static LOGGER: Logger = Logger {};

/// Terminal backend for the `log` facade.
///
/// Lines are written as `HH:MM:SS.mmm [LEVEL] message`, with the level tag colored.
/// Warnings and errors go to stderr so decoded output piped through stdout stays clean.
pub struct Logger {}

impl Logger {
    /// Installs the logger as the global `log` backend.
    ///
    /// # Errors
    ///
    /// Returns `SetLoggerError` if another logger was installed first.
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }

    fn get_timestamp() -> String {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();

        let secs = now.as_secs();
        let millis = now.subsec_millis();

        let hours = (secs / 3600) % 24;
        let minutes = (secs / 60) % 60;
        let seconds = secs % 60;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }

    fn format_line(level: Level, message: &std::fmt::Arguments) -> String {
        let (level_str, color) = match level {
            Level::Trace | Level::Debug => ("DEBUG", BLUE),
            Level::Info => ("INFO", GREEN),
            Level::Warn => ("WARN", YELLOW),
            Level::Error => ("ERROR", RED),
        };

        format!(
            "{} [{}{}{}] {}",
            Self::get_timestamp(),
            color,
            level_str,
            RESET,
            message
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format_line(record.level(), record.args());

        match record.level() {
            Level::Warn | Level::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let line = Logger::format_line(Level::Warn, &format_args!("strip {} truncated", 3));

        assert!(line.contains("WARN"));
        assert!(line.ends_with("strip 3 truncated"));
        // HH:MM:SS.mmm prefix
        assert_eq!(line.as_bytes()[2], b':');
        assert_eq!(line.as_bytes()[8], b'.');
    }

    #[test]
    fn test_second_init_reports_error() {
        fn install() -> Result<(), Box<dyn std::error::Error>> {
            Logger::init(LevelFilter::Info).map_err(|e| e.to_string())?;
            Ok(())
        }

        let _ = install();
        assert!(install().is_err());
    }
}
