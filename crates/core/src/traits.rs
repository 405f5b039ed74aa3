//! Core traits for the storage region abstraction
//!
//! The transactional read path never touches storage directly. It talks to a
//! `Region`: one ordered, versioned, column-family table (or a shard of one)
//! that can open range scanners and answer exact-version point lookups.
//!
//! Retention, compaction and write handling belong to the implementation.

use crate::error::StrataResult;
use crate::schema::TableDescriptor;
use crate::types::{Cell, Get, Scan};

/// One row's worth of cells from a scanner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowBatch {
    /// Cells of a single row in key order; empty when nothing matched
    pub cells: Vec<Cell>,
    /// False once the scanner has nothing left
    pub more: bool,
}

/// Ordered, versioned storage region
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait Region: Send + Sync {
    /// Definition of the table this region serves
    fn descriptor(&self) -> &TableDescriptor;

    /// Open a range scanner
    ///
    /// The scanner owns whatever resources it needs; dropping it releases them.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan names unknown families or the region
    /// cannot serve it.
    fn open_scanner(&self, scan: &Scan) -> StrataResult<Box<dyn RegionScanner>>;

    /// Fetch exact versions of columns within one row
    ///
    /// Versions that do not exist are simply absent from the result.
    /// Results are in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, get: &Get) -> StrataResult<Vec<Cell>>;
}

/// Cursor over the rows of a scan
pub trait RegionScanner: Send {
    /// Return the next row's cells
    ///
    /// `size_hint` is advisory; a row is never split across batches.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn next_row(&mut self, size_hint: usize) -> StrataResult<RowBatch>;
}
