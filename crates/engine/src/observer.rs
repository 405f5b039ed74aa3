//! Observability sink for snapshot scans
//!
//! The scanner reports what happened to each row it resolved through a
//! `ScanObserver` handed to it explicitly. `ScanMetrics` is the counting
//! implementation; `NoopObserver` is the default.

use std::sync::atomic::{AtomicU64, Ordering};

/// Receives per-row outcomes of snapshot scans
///
/// Called synchronously on the scanning thread. Implementations must be cheap.
pub trait ScanObserver: Send + Sync {
    /// A lock at or below the snapshot was returned as a conflict
    fn on_conflict(&self, _row: &[u8]) {}

    /// A row resolved to visible data
    fn on_value(&self, _row: &[u8]) {}

    /// A row had only DELETE writes visible and was dropped
    fn on_tombstoned(&self, _row: &[u8]) {}

    /// Committed writes pointed at `missing` data cells that were not found
    fn on_missing_data(&self, _row: &[u8], _missing: usize) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Counting observer
///
/// The counters use Relaxed ordering: they are purely observational and do
/// not synchronize any other memory.
#[derive(Debug, Default)]
pub struct ScanMetrics {
    conflicts: AtomicU64,
    values: AtomicU64,
    tombstoned: AtomicU64,
    missing_data_rows: AtomicU64,
    missing_data_cells: AtomicU64,
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanMetricsSnapshot {
    /// Rows returned as conflicts
    pub conflicts: u64,
    /// Rows returned with data
    pub values: u64,
    /// Rows dropped because only DELETE writes were visible
    pub tombstoned: u64,
    /// Rows with at least one dangling write pointer
    pub missing_data_rows: u64,
    /// Dangling write pointers seen
    pub missing_data_cells: u64,
}

impl ScanMetrics {
    /// All counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the counters
    pub fn snapshot(&self) -> ScanMetricsSnapshot {
        ScanMetricsSnapshot {
            conflicts: self.conflicts.load(Ordering::Relaxed),
            values: self.values.load(Ordering::Relaxed),
            tombstoned: self.tombstoned.load(Ordering::Relaxed),
            missing_data_rows: self.missing_data_rows.load(Ordering::Relaxed),
            missing_data_cells: self.missing_data_cells.load(Ordering::Relaxed),
        }
    }
}

impl ScanObserver for ScanMetrics {
    fn on_conflict(&self, _row: &[u8]) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    fn on_value(&self, _row: &[u8]) {
        self.values.fetch_add(1, Ordering::Relaxed);
    }

    fn on_tombstoned(&self, _row: &[u8]) {
        self.tombstoned.fetch_add(1, Ordering::Relaxed);
    }

    fn on_missing_data(&self, _row: &[u8], missing: usize) {
        self.missing_data_rows.fetch_add(1, Ordering::Relaxed);
        self.missing_data_cells.fetch_add(missing as u64, Ordering::Relaxed);
    }
}
