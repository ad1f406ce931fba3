use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

// Custom logger structure
#[derive(Debug)]
struct LinebotLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

impl log::Log for LinebotLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        // Debug and trace output is limited to the requested topics, if any were given
        match &self.debug_filters {
            Some(filters)
                if metadata.level() == log::Level::Debug
                    || metadata.level() == log::Level::Trace =>
            {
                filters.contains(metadata.target())
                    || filters.iter().any(|f| metadata.target().starts_with(f.as_str()))
            }
            _ => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_color = match record.level() {
            log::Level::Error => "\x1B[31m", // Red
            log::Level::Warn => "\x1B[33m",  // Yellow
            log::Level::Info => "\x1B[32m",  // Green
            log::Level::Debug => "\x1B[36m", // Cyan
            log::Level::Trace => "\x1B[35m", // Magenta
        };
        let reset = "\x1B[0m";
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        let message = record.args().to_string();
        let context = tick_context(&message)
            .map(|tick| format!("[T{:05}] ", tick))
            .unwrap_or_default();

        let mut output = format!(
            "{timestamp} {level_color}{level:5}{reset} {context}{target}: {message}",
            level = record.level(),
            target = record.target(),
        );

        if let Some(module_path) = record.module_path() {
            if module_path != record.target() {
                output.push_str(&format!(" [{}]", module_path));
            }
        }

        // A closed stdout is not worth panicking over
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", output);
        let _ = stdout.flush();
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

// Pulls N out of a "Tick N" phrase so tick lines line up in the output
fn tick_context(message: &str) -> Option<u64> {
    let start = message.find("Tick ")? + 5;
    let digits: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

static LOGGER: OnceLock<LinebotLogger> = OnceLock::new();

/// Installs the logger. `debug_filter` is a comma separated list of topics
/// (sim, sensor, drive, policy, track) that may emit debug/trace output.
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| LinebotLogger {
        level,
        debug_filters: debug_filter.map(|filter_str| {
            filter_str
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<HashSet<String>>()
        }),
    });

    log::set_logger(logger).map(|()| log::set_max_level(level))
}

pub fn parse_level(name: &str) -> LevelFilter {
    match name.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

// Helper macros for specific debug topics
#[macro_export]
macro_rules! debug_sim {
    ($($arg:tt)*) => {
        log::debug!(target: "sim", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_sensor {
    ($($arg:tt)*) => {
        log::debug!(target: "sensor", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_drive {
    ($($arg:tt)*) => {
        log::debug!(target: "drive", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_policy {
    ($($arg:tt)*) => {
        log::debug!(target: "policy", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_track {
    ($($arg:tt)*) => {
        log::debug!(target: "track", "{}", format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_tick_context() {
        assert_eq!(tick_context("Tick 42 done: Straight"), Some(42));
        assert_eq!(tick_context("Ignoring stale Tick 7"), Some(7));
        assert_eq!(tick_context("Readings [1, 2]"), None);
        assert_eq!(tick_context("Tick x"), None);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("bogus"), LevelFilter::Info);
    }

    fn meta(level: log::Level, target: &'static str) -> Metadata<'static> {
        Metadata::builder().level(level).target(target).build()
    }

    #[test]
    fn test_debug_filters_limit_topics() {
        let logger = LinebotLogger {
            level: LevelFilter::Debug,
            debug_filters: Some(["drive".to_string()].into_iter().collect()),
        };

        assert!(logger.enabled(&meta(log::Level::Debug, "drive")));
        assert!(!logger.enabled(&meta(log::Level::Debug, "sensor")));
        // Info and above ignore topic filters
        assert!(logger.enabled(&meta(log::Level::Info, "sensor")));
        assert!(!logger.enabled(&meta(log::Level::Trace, "drive")));
    }
}
