//! Aggregate view over the active cell set.

use serde::{Deserialize, Serialize};

use super::types::{Cell, StatusClass};

/// Counts derived from one snapshot of active cells.
///
/// `total` counts every active cell while the three buckets only count
/// classified ones, so `total - (free + occupied + unavailable)` is the
/// number of cells carrying an unrecognised status code. There is
/// intentionally no `other` bucket in the wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total: usize,
    pub free: usize,
    pub occupied: usize,
    pub unavailable: usize,
}

impl StatsSummary {
    /// Fold cells into a summary. Excluded cells (status 0) are skipped.
    pub fn from_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        cells
            .into_iter()
            .filter(|cell| cell.is_active())
            .fold(Self::default(), |mut acc, cell| {
                acc.total += 1;
                match cell.class() {
                    StatusClass::Free => acc.free += 1,
                    StatusClass::Occupied => acc.occupied += 1,
                    StatusClass::Unavailable => acc.unavailable += 1,
                    StatusClass::Other => {}
                }
                acc
            })
    }

    /// Cells counted in `total` but in none of the buckets.
    pub fn unclassified(&self) -> usize {
        self.total
            .saturating_sub(self.free + self.occupied + self.unavailable)
    }
}
