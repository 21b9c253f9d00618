//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (accepted in server.rs, tracked by net::connection)
//!     → middleware: CORS, x-request-id, TraceLayer
//!     → /api/cells, /api/stats → handlers.rs → cells::DataAccess
//!     → /api/health            → handlers.rs (no backend)
//!     → anything else          → static files (ServeDir)
//!     → response.rs envelopes / ApiError → JSON body
//! ```
//!
//! # Design Decisions
//! - Handlers are stateless; the shared DataAccess decides availability
//! - Error bodies use fixed messages so backend detail never leaks

pub mod handlers;
pub mod response;
pub mod server;

pub use response::{ApiError, DataResponse, ErrorResponse, HealthResponse};
pub use server::{build_router, HttpServer};
