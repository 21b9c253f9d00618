//! Cell domain: model, aggregation, and the data access layer.
//!
//! # Data Flow
//! ```text
//! Backend rows
//!     → access.rs (accepting check, filter status 0, sort by number)
//!     → Vec<Cell>                      (GET /api/cells)
//!     → stats.rs StatsSummary::from_cells (GET /api/stats)
//! ```

pub mod access;
pub mod stats;
pub mod types;

pub use access::{DataAccess, DataError};
pub use stats::StatsSummary;
pub use types::{Cell, StatusClass};
