//! Scan filters
//!
//! A filter has a row-level part (decided from the row key alone) and a
//! cell-level part (decided per cell). Transactional scans push only the
//! row-level part down to the metadata scan and apply the full filter to the
//! resolved data cells.

use crate::types::Cell;

/// Predicate applied to scanned rows and cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Keep rows whose key starts with the prefix
    RowPrefix(Vec<u8>),
    /// Keep cells whose qualifier starts with the prefix
    QualifierPrefix(Vec<u8>),
    /// Keep cells whose value equals the bytes
    ValueEquals(Vec<u8>),
    /// Keep only what every inner filter keeps
    All(Vec<Filter>),
}

impl Filter {
    /// Row-level decision. Cell-level variants accept every row.
    pub fn accepts_row(&self, row: &[u8]) -> bool {
        match self {
            Filter::RowPrefix(prefix) => row.starts_with(prefix),
            Filter::QualifierPrefix(_) | Filter::ValueEquals(_) => true,
            Filter::All(filters) => filters.iter().all(|f| f.accepts_row(row)),
        }
    }

    /// Full decision for a single cell, row-level parts included
    pub fn accepts_cell(&self, cell: &Cell) -> bool {
        match self {
            Filter::RowPrefix(prefix) => cell.row.starts_with(prefix),
            Filter::QualifierPrefix(prefix) => cell.qualifier.starts_with(prefix),
            Filter::ValueEquals(value) => &cell.value == value,
            Filter::All(filters) => filters.iter().all(|f| f.accepts_cell(cell)),
        }
    }

    /// The part of this filter that depends only on the row key
    ///
    /// Returns `None` when nothing row-level remains.
    pub fn row_filter(&self) -> Option<Filter> {
        match self {
            Filter::RowPrefix(_) => Some(self.clone()),
            Filter::QualifierPrefix(_) | Filter::ValueEquals(_) => None,
            Filter::All(filters) => {
                let mut parts: Vec<Filter> =
                    filters.iter().filter_map(Filter::row_filter).collect();
                match parts.len() {
                    0 => None,
                    1 => parts.pop(),
                    _ => Some(Filter::All(parts)),
                }
            }
        }
    }
}
