//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields)
//!         → logging.rs subscriber (pretty or JSON, EnvFilter)
//!
//! Lifecycle milestones additionally go through:
//!     → sink.rs (LogSink)
//!         → tracing event
//!         → optional host callback "[HH:MM:SS] message"
//! ```

pub mod logging;
pub mod sink;

pub use sink::{LogCallback, LogLevel, LogSink};
