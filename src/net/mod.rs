//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Service::start
//!     → address.rs (pick LAN IPv4 for the public URL)
//!     → listener.rs (bind 0.0.0.0:port)
//!     → http::server accept loop
//!         → connection.rs (guard per accepted connection)
//! ```
//!
//! # Design Decisions
//! - Address lookup is never cached; interfaces change between runs
//! - Each connection is tracked so a forced drain can report leftovers

pub mod address;
pub mod connection;
pub mod listener;

pub use address::resolve_local_address;
pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{bind, ListenError};
