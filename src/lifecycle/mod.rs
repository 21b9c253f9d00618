//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start (service.rs):
//!     Connect backend → Resolve LAN address → Bind port → Serve → Running
//!
//! Stop (service.rs + shutdown.rs):
//!     Refuse data requests → Close listener → Drain (3 s) → Abort rest
//!     → Close backend → Idle
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop the service before the process exits
//! ```
//!
//! # Design Decisions
//! - One transition at a time: a concurrent `start` is rejected, `stop` waits
//! - Stop never fails; every cleanup error is logged and swallowed
//! - Shutdown has a deadline: connections still open after it are aborted

pub mod service;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use service::{Endpoint, Service, ServiceError};
pub use shutdown::{DrainOutcome, Shutdown, GRACE_PERIOD};
pub use signals::shutdown_signal;
pub use state::ServiceState;
