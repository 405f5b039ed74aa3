//! Snapshot scanner: what was visible at timestamp T
//!
//! A snapshot scan never reads data cells directly. It scans the lock and
//! write columns of the requested data columns up to T, then per row:
//!
//! 1. lock cells present: return them as a conflict
//! 2. otherwise follow the latest PUT writes to their data versions with a
//!    single point lookup and return what it finds
//! 3. rows with nothing visible are skipped
//!
//! # Lifecycle
//!
//! `Opening` → `Iterating` → `Done`. The internal scanner is dropped as soon
//! as the scan reaches `Done`, whether it ran to the end or failed.

use std::sync::Arc;

use strata_core::column::{
    check_data_family, check_data_qualifier, data_column_of_lock, is_lock_family, lock_column,
    lock_qualifier_prefix, write_column, DELETE_SUFFIX, LOCK_FAMILY, PUT_SUFFIX,
};
use strata_core::{
    escape_bytes, Cell, ColumnSelector, Filter, Region, RegionScanner, Scan, StrataError,
    StrataResult, TableDescriptor, WriteType,
};
use tracing::{debug, warn};

use crate::config::TxnConfig;
use crate::observer::ScanObserver;
use crate::resolve::{data_get, resolve_row, RowResolution, WritePointer};
use crate::result::RowResult;

/// Lifecycle of a snapshot scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Building the internal scan
    Opening,
    /// Rows may remain
    Iterating,
    /// Exhausted or failed; the internal scanner is released
    Done,
}

/// Families a snapshot scan reads, after checking the table is enrolled
///
/// An empty family selection means every data family of the table.
///
/// # Errors
///
/// Returns a configuration error if the table has no lock family, any
/// family name contains the reserved separator, or a requested family is
/// unknown or is the lock family itself.
pub fn transactional_families(table: &TableDescriptor, scan: &Scan) -> StrataResult<Vec<Vec<u8>>> {
    if !table.has_family(LOCK_FAMILY) {
        return Err(StrataError::configuration(format!(
            "family not configured for transactions: table '{}' has no lock family",
            table.name()
        )));
    }
    for family in table.families() {
        check_data_family(family.name())?;
    }

    let requested = scan.families();
    if requested.is_empty() {
        return Ok(table
            .families()
            .iter()
            .map(|f| f.name().to_vec())
            .filter(|name| !is_lock_family(name))
            .collect());
    }

    let mut families = Vec::with_capacity(requested.len());
    for family in requested {
        if is_lock_family(family) || !table.has_family(family) {
            return Err(StrataError::configuration(format!(
                "family not configured for transactions: '{}' in table '{}'",
                escape_bytes(family),
                table.name()
            )));
        }
        families.push(family.to_vec());
    }
    Ok(families)
}

/// Build the internal lock + write scan for a snapshot read at `snapshot_ts`
///
/// Keeps the row range, bounds versions to `snapshot_ts` inclusive, reads one
/// version per metadata column and pushes down only the row-level part of
/// the user filter.
///
/// # Errors
///
/// Returns a configuration error for qualifiers containing the reserved
/// separator and for selectors other than whole families or exact columns.
pub fn build_internal_scan(
    scan: &Scan,
    families: &[Vec<u8>],
    snapshot_ts: u64,
) -> StrataResult<Scan> {
    let mut internal = Scan::new()
        .with_start_row(scan.start_row())
        .with_stop_row(scan.stop_row())
        .with_max_timestamp(snapshot_ts)
        .with_max_versions(1);

    if scan.columns().is_empty() {
        for family in families {
            internal = with_family_metadata(internal, family);
        }
    }
    for selector in scan.columns() {
        internal = match selector {
            ColumnSelector::Family(family) => with_family_metadata(internal, family),
            ColumnSelector::Column(column) => {
                check_data_qualifier(&column.qualifier)?;
                internal
                    .with_selector(ColumnSelector::Column(lock_column(column)))
                    .with_selector(ColumnSelector::Column(write_column(column, WriteType::Put)))
                    .with_selector(ColumnSelector::Column(write_column(
                        column,
                        WriteType::Delete,
                    )))
            }
            other => {
                return Err(StrataError::configuration(format!(
                    "snapshot scans only select whole families or exact columns, got {:?}",
                    other
                )))
            }
        };
    }

    if let Some(row_filter) = scan.filter().and_then(Filter::row_filter) {
        internal = internal.with_filter(row_filter);
    }
    Ok(internal)
}

fn with_family_metadata(scan: Scan, family: &[u8]) -> Scan {
    scan.with_selector(ColumnSelector::QualifierPrefix {
        family: LOCK_FAMILY.to_vec(),
        prefix: lock_qualifier_prefix(family),
    })
    .with_selector(ColumnSelector::QualifierSuffix {
        family: family.to_vec(),
        suffixes: vec![PUT_SUFFIX.to_vec(), DELETE_SUFFIX.to_vec()],
    })
}

/// Scanner answering a scan as of a snapshot timestamp
///
/// Owns its internal scanner; nothing is shared with other scans.
pub struct SnapshotScanner<R: Region + ?Sized> {
    region: Arc<R>,
    inner: Option<Box<dyn RegionScanner>>,
    data_filter: Option<Filter>,
    snapshot_ts: u64,
    state: ScanState,
    config: TxnConfig,
    observer: Arc<dyn ScanObserver>,
}

impl<R: Region + ?Sized> SnapshotScanner<R> {
    /// Open a snapshot scan at `snapshot_ts`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the scan targets families that are
    /// not transactional, or a storage error if the region refuses the
    /// internal scan.
    pub fn open(
        region: Arc<R>,
        scan: &Scan,
        snapshot_ts: u64,
        config: TxnConfig,
        observer: Arc<dyn ScanObserver>,
    ) -> StrataResult<Self> {
        let mut scanner = Self {
            region,
            inner: None,
            data_filter: scan.filter().cloned(),
            snapshot_ts,
            state: ScanState::Opening,
            config,
            observer,
        };

        let families = transactional_families(scanner.region.descriptor(), scan)?;
        let internal = build_internal_scan(scan, &families, snapshot_ts)?;
        let inner = scanner
            .region
            .open_scanner(&internal)
            .map_err(|e| StrataError::storage("failed to open snapshot metadata scanner", e))?;

        debug!(
            target: "strata::txn",
            table = scanner.region.descriptor().name(),
            snapshot_ts,
            families = families.len(),
            "Opened snapshot scan"
        );
        scanner.inner = Some(inner);
        scanner.state = ScanState::Iterating;
        Ok(scanner)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Snapshot timestamp this scan reads at
    pub fn snapshot_ts(&self) -> u64 {
        self.snapshot_ts
    }

    /// Append up to `limit` row results to `results`
    ///
    /// Returns `Ok(false)` once the scan is exhausted, even if fewer than
    /// `limit` rows were produced. Rows pushed before a failure stay in
    /// `results`; after a failure the scan is `Done`.
    ///
    /// # Errors
    ///
    /// Storage failures are wrapped as storage errors. Malformed write
    /// pointers surface as codec errors and, with `strict_data_lookup`,
    /// dangling pointers as inconsistency errors.
    pub fn next(&mut self, results: &mut Vec<RowResult>, limit: usize) -> StrataResult<bool> {
        let outcome = self.advance(results, limit);
        if !matches!(outcome, Ok(true)) {
            self.finish();
        }
        outcome
    }

    fn advance(&mut self, results: &mut Vec<RowResult>, limit: usize) -> StrataResult<bool> {
        if self.inner.is_none() {
            return Ok(false);
        }
        let mut emitted = 0;
        while emitted < limit {
            let batch = match self.inner.as_mut() {
                Some(inner) => inner.next_row(self.config.scan_batch_hint).map_err(|e| {
                    StrataError::storage("snapshot scan failed to advance metadata scanner", e)
                })?,
                None => return Ok(false),
            };
            if !batch.cells.is_empty() && self.process_row(batch.cells, results)? {
                emitted += 1;
            }
            if !batch.more {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn finish(&mut self) {
        if self.state != ScanState::Done {
            debug!(target: "strata::txn", snapshot_ts = self.snapshot_ts, "Snapshot scan done");
        }
        self.state = ScanState::Done;
        self.inner = None;
    }

    /// Resolve one row; returns whether it produced a result
    fn process_row(&self, cells: Vec<Cell>, results: &mut Vec<RowResult>) -> StrataResult<bool> {
        let row = cells[0].row.clone();
        match resolve_row(cells)? {
            RowResolution::Conflict(locks) => {
                let guarded = locks
                    .first()
                    .and_then(|lock| data_column_of_lock(&lock.column()))
                    .map_or_else(String::new, |column| column.to_string());
                warn!(
                    target: "strata::txn",
                    row = %escape_bytes(&row),
                    column = %guarded,
                    locks = locks.len(),
                    snapshot_ts = self.snapshot_ts,
                    "Encountered conflicting lock in snapshot scan"
                );
                self.observer.on_conflict(&row);
                results.push(RowResult::Conflict(locks));
                Ok(true)
            }
            RowResolution::Tombstoned => {
                self.observer.on_tombstoned(&row);
                Ok(false)
            }
            RowResolution::Fetch(pointers) => self.fetch_row(&row, &pointers, results),
        }
    }

    fn fetch_row(
        &self,
        row: &[u8],
        pointers: &[WritePointer],
        results: &mut Vec<RowResult>,
    ) -> StrataResult<bool> {
        let found = self.region.get(&data_get(row, pointers)).map_err(|e| {
            StrataError::storage(
                format!("snapshot scan data lookup failed for row '{}'", escape_bytes(row)),
                e,
            )
        })?;

        let missing = pointers.len().saturating_sub(found.len());
        if missing > 0 {
            warn!(
                target: "strata::txn",
                row = %escape_bytes(row),
                missing,
                snapshot_ts = self.snapshot_ts,
                "Committed write points at missing data cell"
            );
            self.observer.on_missing_data(row, missing);
            if self.config.strict_data_lookup {
                return Err(StrataError::inconsistency(
                    row,
                    format!("{} committed write(s) point at missing data cells", missing),
                ));
            }
        }

        let cells: Vec<Cell> = match &self.data_filter {
            Some(filter) => found.into_iter().filter(|c| filter.accepts_cell(c)).collect(),
            None => found,
        };
        if cells.is_empty() {
            return Ok(false);
        }
        self.observer.on_value(row);
        results.push(RowResult::Value(cells));
        Ok(true)
    }
}
