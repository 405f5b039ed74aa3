//! MemRegion: in-memory region backend with BTreeMap and version retention
//!
//! This module implements the Region trait using:
//! - `BTreeMap<CellKey, Vec<u8>>` ordered by row, family, qualifier, newest first
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicUsize` counting live scanners so release on every path is observable
//!
//! # Design Notes
//!
//! - **Per-family retention**: `max_versions` is enforced on write; older
//!   versions beyond the limit are dropped immediately
//! - **TTL is recorded, not enforced**: timestamps are logical, so age-based
//!   expiry has no clock to compare against
//! - **Scanners re-seek per row**: a scanner never holds the lock between calls,
//!   it remembers the last row returned and resumes after it

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use strata_core::{
    escape_bytes, Cell, Column, Get, Region, RegionScanner, RowBatch, Scan, StrataError,
    StrataResult, TableDescriptor,
};

use crate::fault::FaultPlan;

type CellMap = BTreeMap<CellKey, Vec<u8>>;

/// Sort key of a stored cell
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CellKey {
    row: Vec<u8>,
    family: Vec<u8>,
    qualifier: Vec<u8>,
    ts: Reverse<u64>,
}

impl CellKey {
    fn new(row: &[u8], family: &[u8], qualifier: &[u8], ts: u64) -> Self {
        Self {
            row: row.to_vec(),
            family: family.to_vec(),
            qualifier: qualifier.to_vec(),
            ts: Reverse(ts),
        }
    }

    /// Smallest possible key of `row`
    fn row_start(row: &[u8]) -> Self {
        Self::new(row, b"", b"", u64::MAX)
    }

    /// Smallest possible key of a column (its newest version)
    fn column_start(row: &[u8], family: &[u8], qualifier: &[u8]) -> Self {
        Self::new(row, family, qualifier, u64::MAX)
    }

    fn same_column(&self, other: &CellKey) -> bool {
        self.row == other.row && self.family == other.family && self.qualifier == other.qualifier
    }

    fn to_cell(&self, value: &[u8]) -> Cell {
        Cell::new(
            self.row.clone(),
            self.family.clone(),
            self.qualifier.clone(),
            self.ts.0,
            value,
        )
    }
}

/// Decrements the live scanner count when dropped
#[derive(Debug)]
struct ScannerGuard {
    open: Arc<AtomicUsize>,
}

impl ScannerGuard {
    fn acquire(open: &Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self { open: Arc::clone(open) }
    }
}

impl Drop for ScannerGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory region serving one table
///
/// Thread-safe through `parking_lot::RwLock`. Cloning the handle is not
/// supported; share it behind an `Arc`.
#[derive(Debug)]
pub struct MemRegion {
    descriptor: TableDescriptor,
    data: Arc<RwLock<CellMap>>,
    open_scanners: Arc<AtomicUsize>,
    faults: Arc<FaultPlan>,
}

impl MemRegion {
    /// Create an empty region for a table
    pub fn new(descriptor: TableDescriptor) -> Self {
        Self {
            descriptor,
            data: Arc::new(RwLock::new(BTreeMap::new())),
            open_scanners: Arc::new(AtomicUsize::new(0)),
            faults: Arc::new(FaultPlan::new()),
        }
    }

    /// Write one cell version
    ///
    /// Overwrites an existing cell at the same timestamp. Versions beyond the
    /// family's `max_versions` are dropped, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the family does not exist.
    pub fn put(
        &self,
        row: impl AsRef<[u8]>,
        family: impl AsRef<[u8]>,
        qualifier: impl AsRef<[u8]>,
        ts: u64,
        value: impl Into<Vec<u8>>,
    ) -> StrataResult<()> {
        let (row, family, qualifier) = (row.as_ref(), family.as_ref(), qualifier.as_ref());
        let max_versions = self
            .descriptor
            .family(family)
            .map(|f| f.max_versions())
            .ok_or_else(|| {
                StrataError::configuration(format!(
                    "family '{}' does not exist in table '{}'",
                    escape_bytes(family),
                    self.descriptor.name()
                ))
            })?;

        let mut data = self.data.write();
        data.insert(CellKey::new(row, family, qualifier, ts), value.into());

        let first = CellKey::column_start(row, family, qualifier);
        let expired: Vec<CellKey> = data
            .range(first.clone()..)
            .take_while(|(k, _)| k.same_column(&first))
            .skip(max_versions as usize)
            .map(|(k, _)| k.clone())
            .collect();
        if !expired.is_empty() {
            debug!(
                target: "strata::storage",
                row = %escape_bytes(row),
                column = %Column::new(family, qualifier),
                dropped = expired.len(),
                "Trimmed versions beyond family max_versions"
            );
        }
        for key in expired {
            data.remove(&key);
        }
        Ok(())
    }

    /// Remove one exact cell version; returns whether it existed
    pub fn delete_version(&self, row: &[u8], column: &Column, ts: u64) -> bool {
        let key = CellKey::new(row, &column.family, &column.qualifier, ts);
        self.data.write().remove(&key).is_some()
    }

    /// Number of stored cell versions
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Scanners opened and not yet dropped
    pub fn open_scanner_count(&self) -> usize {
        self.open_scanners.load(Ordering::SeqCst)
    }

    /// Fault injection handle
    pub fn faults(&self) -> &FaultPlan {
        &self.faults
    }

    fn check_families(&self, families: &[&[u8]]) -> StrataResult<()> {
        for family in families {
            if !self.descriptor.has_family(family) {
                return Err(StrataError::configuration(format!(
                    "family '{}' does not exist in table '{}'",
                    escape_bytes(family),
                    self.descriptor.name()
                )));
            }
        }
        Ok(())
    }
}

impl Region for MemRegion {
    fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    fn open_scanner(&self, scan: &Scan) -> StrataResult<Box<dyn RegionScanner>> {
        self.check_families(&scan.families())?;
        Ok(Box::new(MemRegionScanner {
            data: Arc::clone(&self.data),
            faults: Arc::clone(&self.faults),
            scan: scan.clone(),
            last_row: None,
            returned: 0,
            _guard: ScannerGuard::acquire(&self.open_scanners),
        }))
    }

    fn get(&self, get: &Get) -> StrataResult<Vec<Cell>> {
        self.faults.check_get()?;
        let data = self.data.read();
        let mut keys: Vec<CellKey> = get
            .lookups
            .iter()
            .map(|(column, ts)| CellKey::new(&get.row, &column.family, &column.qualifier, *ts))
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys
            .iter()
            .filter_map(|key| data.get(key).map(|value| key.to_cell(value)))
            .collect())
    }
}

/// Row cursor over a MemRegion
struct MemRegionScanner {
    data: Arc<RwLock<CellMap>>,
    faults: Arc<FaultPlan>,
    scan: Scan,
    last_row: Option<Vec<u8>>,
    returned: usize,
    _guard: ScannerGuard,
}

impl MemRegionScanner {
    /// First stored row strictly after `after` (or at/after the start row)
    fn next_row_key(&self, data: &CellMap, after: Option<&[u8]>) -> Option<Vec<u8>> {
        let lower = CellKey::row_start(after.unwrap_or(self.scan.start_row()));
        data.range(lower..)
            .map(|(k, _)| &k.row)
            .find(|row| after.map_or(true, |a| row.as_slice() > a))
            .filter(|row| self.scan.before_stop(row))
            .cloned()
    }

    /// True if some row after `row` still has cells to return
    fn has_row_after(&self, data: &CellMap, row: &[u8]) -> bool {
        let mut after = row.to_vec();
        while let Some(next) = self.next_row_key(data, Some(&after)) {
            if !self.row_cells(data, &next).is_empty() {
                return true;
            }
            after = next;
        }
        false
    }

    /// Selected, time-bounded, filtered cells of one row
    fn row_cells(&self, data: &CellMap, row: &[u8]) -> Vec<Cell> {
        let filter = self.scan.filter();
        if let Some(f) = filter {
            if !f.accepts_row(row) {
                return Vec::new();
            }
        }

        let mut cells = Vec::new();
        let mut current: Option<&CellKey> = None;
        let mut versions = 0u32;
        for (key, value) in data
            .range(CellKey::row_start(row)..)
            .take_while(|(k, _)| k.row == row)
        {
            if !self.scan.selects(&key.family, &key.qualifier) {
                continue;
            }
            if self.scan.max_timestamp().map_or(false, |max| key.ts.0 > max) {
                continue;
            }
            if current.map_or(true, |c| !c.same_column(key)) {
                current = Some(key);
                versions = 0;
            }
            if versions >= self.scan.max_versions() {
                continue;
            }
            let cell = key.to_cell(value);
            if filter.map_or(true, |f| f.accepts_cell(&cell)) {
                versions += 1;
                cells.push(cell);
            }
        }
        cells
    }
}

impl RegionScanner for MemRegionScanner {
    fn next_row(&mut self, _size_hint: usize) -> StrataResult<RowBatch> {
        self.faults.check_scanner(self.returned)?;
        let data = self.data.read();

        let mut after = self.last_row.clone();
        loop {
            let Some(row) = self.next_row_key(&data, after.as_deref()) else {
                self.last_row = after;
                return Ok(RowBatch {
                    cells: Vec::new(),
                    more: false,
                });
            };
            let cells = self.row_cells(&data, &row);
            if cells.is_empty() {
                after = Some(row);
                continue;
            }
            let more = self.has_row_after(&data, &row);
            self.last_row = Some(row);
            self.returned += 1;
            return Ok(RowBatch { cells, more });
        }
    }
}
