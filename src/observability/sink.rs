//! Human-readable log lines for a host UI.
//!
//! Every line also goes to `tracing`; the callback is a side channel and has
//! no effect on behavior.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::Local;

/// Observer receiving lines formatted as `[HH:MM:SS] message`.
pub type LogCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Severity of a sink line, mapped onto `tracing` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Fan-out point for lifecycle log lines.
#[derive(Default)]
pub struct LogSink {
    callback: ArcSwapOption<LogCallback>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the observer.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let callback: LogCallback = Box::new(callback);
        self.callback.store(Some(Arc::new(callback)));
    }

    pub fn clear_callback(&self) {
        self.callback.store(None);
    }

    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message);
    }

    pub fn emit(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => tracing::info!(target: "cell_monitor::service", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "cell_monitor::service", "{message}"),
            LogLevel::Error => tracing::error!(target: "cell_monitor::service", "{message}"),
        }

        if let Some(callback) = self.callback.load_full() {
            let line = format_line(&Local::now().format("%H:%M:%S").to_string(), message);
            callback(&line);
        }
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink")
            .field("has_callback", &self.callback.load().is_some())
            .finish()
    }
}

fn format_line(time: &str, message: &str) -> String {
    format!("[{time}] {message}")
}
