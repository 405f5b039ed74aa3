//! Shared fixture for engine integration tests
//!
//! Plays the part of the coordinator: writes data, write and lock cells
//! directly into an in-memory region prepared by the schema guard.

#![allow(dead_code)]

use std::sync::Arc;

use strata_core::column::{encode_timestamp, lock_column, write_column};
use strata_core::{Column, ColumnFamilyDescriptor, Scan, TableDescriptor, WriteType, TXN_ENABLE_KEY};
use strata_engine::{with_snapshot, RowResult, ScanMetrics, SchemaGuard, TxnConfig, TxnRegion};
use strata_storage::MemRegion;

pub const CF: &str = "cf";

/// Transactional table with data families `cf` and `meta`
pub fn txn_table(name: &str) -> TableDescriptor {
    let mut table = TableDescriptor::new(name)
        .with_family(ColumnFamilyDescriptor::new(CF).with_attribute(TXN_ENABLE_KEY, "true"))
        .with_family(ColumnFamilyDescriptor::new("meta"));
    SchemaGuard::new().prepare_table(&mut table).unwrap();
    table
}

pub struct Fixture {
    pub region: Arc<MemRegion>,
    pub txn: TxnRegion<MemRegion>,
    pub metrics: Arc<ScanMetrics>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(TxnConfig::default())
    }

    pub fn with_config(config: TxnConfig) -> Self {
        Self::from_table(txn_table("orders"), config)
    }

    pub fn from_table(table: TableDescriptor, config: TxnConfig) -> Self {
        let region = Arc::new(MemRegion::new(table));
        let metrics = Arc::new(ScanMetrics::new());
        let txn = TxnRegion::new(Arc::clone(&region))
            .with_config(config)
            .unwrap()
            .with_observer(metrics.clone());
        Self {
            region,
            txn,
            metrics,
        }
    }

    /// Data cell only, as left by a prewrite
    pub fn data(&self, row: &str, qualifier: &str, start_ts: u64, value: &str) {
        self.region.put(row, CF, qualifier, start_ts, value).unwrap();
    }

    /// Write cell only, pointing at `start_ts`
    pub fn write(
        &self,
        row: &str,
        qualifier: &str,
        start_ts: u64,
        commit_ts: u64,
        kind: WriteType,
    ) {
        let col = write_column(&Column::new(CF, qualifier), kind);
        self.region
            .put(row, col.family, col.qualifier, commit_ts, encode_timestamp(start_ts).to_vec())
            .unwrap();
    }

    /// Committed PUT: data at `start_ts`, write at `commit_ts`
    pub fn commit_put(
        &self,
        row: &str,
        qualifier: &str,
        start_ts: u64,
        commit_ts: u64,
        value: &str,
    ) {
        self.data(row, qualifier, start_ts, value);
        self.write(row, qualifier, start_ts, commit_ts, WriteType::Put);
    }

    /// Committed DELETE
    pub fn commit_delete(&self, row: &str, qualifier: &str, start_ts: u64, commit_ts: u64) {
        self.write(row, qualifier, start_ts, commit_ts, WriteType::Delete);
    }

    /// Unresolved intent on a column
    pub fn lock(&self, row: &str, qualifier: &str, start_ts: u64) {
        let col = lock_column(&Column::new(CF, qualifier));
        self.region
            .put(row, col.family, col.qualifier, start_ts, b"primary".to_vec())
            .unwrap();
    }

    /// Every row visible at `ts` for `scan`
    pub fn scan_at(&self, scan: Scan, ts: u64) -> Vec<RowResult> {
        let mut scanner = self.txn.scan_open(&with_snapshot(scan, ts)).unwrap();
        let mut rows = Vec::new();
        while scanner.next(&mut rows, 2).unwrap() {}
        rows
    }

    /// Every row of the default family visible at `ts`
    pub fn scan_all(&self, ts: u64) -> Vec<RowResult> {
        self.scan_at(Scan::new().add_family(CF), ts)
    }
}

/// Row keys of a result list, as strings
pub fn rows_of(results: &[RowResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| String::from_utf8_lossy(r.row()).into_owned())
        .collect()
}

/// Values of a `Value` result, as strings
pub fn values_of(result: &RowResult) -> Vec<String> {
    match result {
        RowResult::Value(cells) => cells
            .iter()
            .map(|c| String::from_utf8_lossy(&c.value).into_owned())
            .collect(),
        RowResult::Conflict(_) => panic!("expected value, got {:?}", result),
    }
}
