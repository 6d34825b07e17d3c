use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

const MAX_LINES: usize = 200;

/// `log` sink that keeps the most recent lines for the console pane.
pub struct ConsoleLogger {
    level: LevelFilter,
    lines: Mutex<VecDeque<String>>,
}

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

impl ConsoleLogger {
    fn new(level: LevelFilter) -> Self {
        Self {
            level,
            lines: Mutex::new(VecDeque::with_capacity(MAX_LINES)),
        }
    }

    pub fn push(&self, line: String) {
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        lines.push_back(line);
        while lines.len() > MAX_LINES {
            lines.pop_front();
        }
    }

    /// The last `n` lines, oldest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let Ok(lines) = self.lines.lock() else {
            return Vec::new();
        };
        let start = lines.len().saturating_sub(n);
        lines.iter().skip(start).cloned().collect()
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.push(format!("[{}] {}", level_tag(record.level()), record.args()));
    }

    fn flush(&self) {}
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Installs the console sink as the global logger. Level comes from
/// `DASH_LOG` (error|warn|info|debug|trace), default info. Calling it twice
/// returns the already installed sink.
pub fn init() -> &'static ConsoleLogger {
    let level = std::env::var("DASH_LOG")
        .ok()
        .and_then(|raw| raw.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    let logger = LOGGER.get_or_init(|| ConsoleLogger::new(level));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
    logger
}
