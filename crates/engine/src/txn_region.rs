//! Transactional front door of a region
//!
//! `TxnRegion` decides per scan whether the request is transactional: a scan
//! carrying the snapshot timestamp attribute becomes a [`SnapshotScanner`],
//! anything else goes straight to the region's own scanner.

use std::sync::Arc;

use strata_core::column::{decode_timestamp, encode_timestamp, SNAPSHOT_TS_ATTRIBUTE};
use strata_core::{ColumnSelector, Region, RegionScanner, Scan, StrataError, StrataResult};

use crate::config::TxnConfig;
use crate::observer::{NoopObserver, ScanObserver};
use crate::result::{RowResult, ScanPage};
use crate::snapshot_scan::SnapshotScanner;

/// Attach a snapshot timestamp to a scan, making it transactional
pub fn with_snapshot(mut scan: Scan, snapshot_ts: u64) -> Scan {
    scan.set_attribute(SNAPSHOT_TS_ATTRIBUTE, encode_timestamp(snapshot_ts).to_vec());
    scan
}

/// Snapshot timestamp attached to a scan, if any
///
/// # Errors
///
/// Returns a configuration error if the attribute is not 8 bytes.
pub fn snapshot_ts_of(scan: &Scan) -> StrataResult<Option<u64>> {
    scan.attribute(SNAPSHOT_TS_ATTRIBUTE)
        .map(|bytes| {
            decode_timestamp(bytes).map_err(|e| {
                StrataError::configuration(format!(
                    "invalid {} attribute: {}",
                    SNAPSHOT_TS_ATTRIBUTE, e
                ))
            })
        })
        .transpose()
}

/// Region wrapper serving snapshot reads
pub struct TxnRegion<R: Region + ?Sized> {
    region: Arc<R>,
    config: TxnConfig,
    observer: Arc<dyn ScanObserver>,
}

impl<R: Region + ?Sized> TxnRegion<R> {
    /// Wrap a region with default configuration and no observer
    pub fn new(region: Arc<R>) -> Self {
        Self {
            region,
            config: TxnConfig::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Use `config` for scans opened from now on
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config does not validate.
    pub fn with_config(mut self, config: TxnConfig) -> StrataResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Report row outcomes to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The wrapped region
    pub fn region(&self) -> &Arc<R> {
        &self.region
    }

    /// Active configuration
    pub fn config(&self) -> &TxnConfig {
        &self.config
    }

    /// Open a scan
    ///
    /// Scans without a snapshot timestamp are served by the region's plain
    /// scanner, unmodified.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed snapshot attribute or
    /// non-transactional families, or whatever the region reports.
    pub fn scan_open(&self, scan: &Scan) -> StrataResult<TxnScanner<R>> {
        let kind = match snapshot_ts_of(scan)? {
            None => ScannerKind::Plain(PlainScanner {
                inner: Some(self.region.open_scanner(scan)?),
                size_hint: self.config.scan_batch_hint,
            }),
            Some(snapshot_ts) => ScannerKind::Snapshot(SnapshotScanner::open(
                Arc::clone(&self.region),
                scan,
                snapshot_ts,
                self.config.clone(),
                Arc::clone(&self.observer),
            )?),
        };
        Ok(TxnScanner {
            kind,
            default_limit: self.config.default_row_limit,
        })
    }

    /// Read one row as of `snapshot_ts`
    ///
    /// An empty selector list reads every data family. Returns `None` when
    /// nothing is visible.
    ///
    /// # Errors
    ///
    /// Same as [`TxnRegion::scan_open`] and [`TxnScanner::next`].
    pub fn get(
        &self,
        row: &[u8],
        selectors: &[ColumnSelector],
        snapshot_ts: u64,
    ) -> StrataResult<Option<RowResult>> {
        let scan = selectors
            .iter()
            .cloned()
            .fold(Scan::single_row(row), Scan::with_selector);
        let mut scanner = self.scan_open(&with_snapshot(scan, snapshot_ts))?;
        let mut results = Vec::with_capacity(1);
        scanner.next(&mut results, 1)?;
        Ok(results.pop())
    }
}

enum ScannerKind<R: Region + ?Sized> {
    Plain(PlainScanner),
    Snapshot(SnapshotScanner<R>),
}

/// Handle returned by [`TxnRegion::scan_open`]
pub struct TxnScanner<R: Region + ?Sized> {
    kind: ScannerKind<R>,
    default_limit: usize,
}

impl<R: Region + ?Sized> TxnScanner<R> {
    /// True if this scan reads at a snapshot
    pub fn is_snapshot(&self) -> bool {
        matches!(self.kind, ScannerKind::Snapshot(_))
    }

    /// The snapshot scanner, if this scan reads at a snapshot
    pub fn snapshot(&self) -> Option<&SnapshotScanner<R>> {
        match &self.kind {
            ScannerKind::Snapshot(scanner) => Some(scanner),
            ScannerKind::Plain(_) => None,
        }
    }

    /// Append up to `limit` rows to `results`; `Ok(false)` once exhausted
    ///
    /// Plain scans return every row as [`RowResult::Value`].
    ///
    /// # Errors
    ///
    /// See [`SnapshotScanner::next`]. Rows appended before a failure stay
    /// in `results`.
    pub fn next(&mut self, results: &mut Vec<RowResult>, limit: usize) -> StrataResult<bool> {
        match &mut self.kind {
            ScannerKind::Plain(scanner) => scanner.next(results, limit),
            ScannerKind::Snapshot(scanner) => scanner.next(results, limit),
        }
    }

    /// Fetch up to `limit` rows as a page
    ///
    /// # Errors
    ///
    /// Same as [`TxnScanner::next`]; rows gathered before the failure are lost.
    pub fn next_page(&mut self, limit: usize) -> StrataResult<ScanPage> {
        let mut rows = Vec::new();
        let more = self.next(&mut rows, limit)?;
        Ok(ScanPage { rows, more })
    }

    /// Fetch a page of the configured default size
    ///
    /// # Errors
    ///
    /// Same as [`TxnScanner::next_page`].
    pub fn next_page_default(&mut self) -> StrataResult<ScanPage> {
        self.next_page(self.default_limit)
    }
}

/// Pass-through scanner for non-transactional scans
struct PlainScanner {
    inner: Option<Box<dyn RegionScanner>>,
    size_hint: usize,
}

impl PlainScanner {
    fn next(&mut self, results: &mut Vec<RowResult>, limit: usize) -> StrataResult<bool> {
        let mut emitted = 0;
        while emitted < limit {
            let Some(inner) = self.inner.as_mut() else {
                return Ok(false);
            };
            let batch = inner.next_row(self.size_hint)?;
            if !batch.cells.is_empty() {
                results.push(RowResult::Value(batch.cells));
                emitted += 1;
            }
            if !batch.more {
                self.inner = None;
                return Ok(false);
            }
        }
        Ok(true)
    }
}
