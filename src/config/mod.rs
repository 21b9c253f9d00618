//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to Service::start for one run
//! ```
//!
//! # Design Decisions
//! - Config is supplied per start; nothing is written back to disk
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{DatabaseConfig, ObservabilityConfig, ServiceConfig, DEFAULT_PORT};
