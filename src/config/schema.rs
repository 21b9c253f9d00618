//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files and
//! default every field, so a file only needs the values that differ.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Port used when the config does not name one.
pub const DEFAULT_PORT: u16 = 3000;

/// Everything one `start` call needs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// TCP port to listen on (all interfaces). `0` lets the OS choose.
    pub port: u16,

    /// Directory served as static assets under `/`.
    pub static_dir: PathBuf,

    /// Backend connection parameters.
    pub database: DatabaseConfig,

    /// Logging settings, consumed by the binary.
    pub observability: ObservabilityConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("public"),
            database: DatabaseConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// SQL Server connection parameters.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Server host name or IP.
    pub host: String,

    /// Server TCP port.
    pub port: u16,

    /// Database (catalog) name.
    pub database: String,

    /// SQL login.
    pub user: String,

    /// SQL password.
    #[serde(skip_serializing)]
    pub password: String,

    /// Require an encrypted connection.
    pub encrypt: bool,

    /// Accept the server certificate without validation.
    pub trust_server_certificate: bool,

    /// Maximum pooled connections.
    pub pool_size: u32,

    /// Driver-level timeout for establishing a connection, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1433,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            encrypt: false,
            trust_server_certificate: true,
            pool_size: 10,
            connect_timeout_secs: 15,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("encrypt", &self.encrypt)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("pool_size", &self.pool_size)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`.
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
