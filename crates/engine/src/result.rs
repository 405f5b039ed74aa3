//! Row-level results of transactional reads

use strata_core::Cell;

/// Outcome of reading one row at a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowResult {
    /// Unresolved locks at or below the snapshot; the caller must resolve them
    Conflict(Vec<Cell>),
    /// Visible data cells
    Value(Vec<Cell>),
}

impl RowResult {
    /// Row key of the result
    pub fn row(&self) -> &[u8] {
        self.cells().first().map_or(&[][..], |c| c.row.as_slice())
    }

    /// Cells carried by the result
    pub fn cells(&self) -> &[Cell] {
        match self {
            RowResult::Conflict(cells) | RowResult::Value(cells) => cells,
        }
    }

    /// Take the cells
    pub fn into_cells(self) -> Vec<Cell> {
        match self {
            RowResult::Conflict(cells) | RowResult::Value(cells) => cells,
        }
    }

    /// True for [`RowResult::Conflict`]
    pub fn is_conflict(&self) -> bool {
        matches!(self, RowResult::Conflict(_))
    }
}

/// Rows produced by one advance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Results in row order
    pub rows: Vec<RowResult>,
    /// False once the scan is exhausted
    pub more: bool,
}
