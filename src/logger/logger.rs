use chrono::Local;
use std::io::Write;
use std::panic::Location;
use std::sync::{Arc, Mutex};

const TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_char(&self) -> char {
        match self {
            Level::Debug => 'D',
            Level::Info => 'I',
            Level::Warning => 'W',
            Level::Error => 'E',
            Level::Critical => 'C',
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub name: String,
    pub debug: bool,
    pub time: bool,
}

/// A logging handle bound to one [`LoggerConfig`]. There is no global
/// registry: callers keep the handle returned by [`get_logger`].
#[derive(Clone)]
pub struct Logger {
    config: LoggerConfig,
    sink: Arc<Mutex<dyn Write + Send>>,
}

pub fn get_logger(name: &str, debug: bool, time: bool) -> Logger {
    Logger::new(LoggerConfig {
        name: name.to_owned(),
        debug,
        time,
    })
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_sink(config, std::io::stderr())
    }

    /// Like [`Logger::new`], but lines go to `sink` instead of stderr.
    pub fn with_sink<W: Write + Send + 'static>(config: LoggerConfig, sink: W) -> Self {
        Self {
            config,
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, Location::caller(), message);
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.emit(Level::Info, Location::caller(), message);
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.emit(Level::Warning, Location::caller(), message);
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.emit(Level::Error, Location::caller(), message);
    }

    #[track_caller]
    pub fn critical(&self, message: &str) {
        self.emit(Level::Critical, Location::caller(), message);
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: &str) {
        self.emit(level, Location::caller(), message);
    }

    fn min_level(&self) -> Level {
        if self.config.debug {
            Level::Debug
        } else {
            Level::Info
        }
    }

    fn emit(&self, level: Level, location: &Location<'_>, message: &str) {
        if level < self.min_level() {
            return;
        }

        let caller = module_name(location.file());
        let line = if self.config.time {
            let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
            format!(
                "[{:>13}:{:>10}:{}:{:>15}] {}",
                timestamp,
                self.config.name,
                level.as_char(),
                caller,
                message
            )
        } else {
            format!(
                "[{:>10}:{}:{:>15}] {}",
                self.config.name,
                level.as_char(),
                caller,
                message
            )
        };

        // A dead sink is an environment problem, not ours to report.
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{}", line);
        }
    }
}

/// Derives a short module identifier from a source file path, so that
/// `src/ws/client.rs` logs as `client` and `src/ws/mod.rs` as `ws`.
fn module_name(file: &str) -> &str {
    let mut parts = file.rsplit(['/', '\\']);
    let name = parts.next().unwrap_or(file);
    let name = name.strip_suffix(".rs").unwrap_or(name);
    if name == "mod" {
        parts.next().unwrap_or(name)
    } else {
        name
    }
}
