//! Cell model and status classification.

use serde::{Deserialize, Serialize};

/// Status code of a cell that is hidden from every response.
pub const STATUS_EXCLUDED: i64 = 0;
/// Status code of a free cell.
pub const STATUS_FREE: i64 = 180;
/// Status code of a reserved cell.
pub const STATUS_RESERVED: i64 = 190;
/// Status code of an occupied cell.
pub const STATUS_OCCUPIED: i64 = 200;
/// Status code of an out-of-service cell.
pub const STATUS_OUT_OF_SERVICE: i64 = 210;

/// A single cell as read from the backend.
///
/// `status` is an opaque code owned by the backend; the service only
/// classifies it (see [`StatusClass`]) and never validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub number: i64,
    pub status: i64,
}

impl Cell {
    pub fn new(number: i64, status: i64) -> Self {
        Self { number, status }
    }

    /// Whether the cell may appear in responses at all.
    pub fn is_active(&self) -> bool {
        self.status != STATUS_EXCLUDED
    }

    pub fn class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }
}

/// Bucket a status code falls into for the stats view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Free,
    Occupied,
    Unavailable,
    /// Any code outside the known set. Counted in `total` only.
    Other,
}

impl StatusClass {
    pub fn of(status: i64) -> Self {
        match status {
            STATUS_FREE => StatusClass::Free,
            STATUS_OCCUPIED => StatusClass::Occupied,
            STATUS_RESERVED | STATUS_OUT_OF_SERVICE => StatusClass::Unavailable,
            _ => StatusClass::Other,
        }
    }
}
