//! Transactional read path for Strata column-family tables
//!
//! This crate provides:
//! - SchemaGuard: table-creation checks and lock family injection
//! - SnapshotScanner: reads what was committed as of a snapshot timestamp,
//!   surfacing unresolved locks as conflicts
//! - TxnRegion: per-scan choice between snapshot and plain reads
//! - ScanObserver: explicit observability sink for row outcomes
//! - TxnConfig: read-path configuration from `strata-txn.toml`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod observer;
pub mod resolve;
pub mod result;
pub mod schema_guard;
pub mod snapshot_scan;
pub mod txn_region;

pub use config::{TxnConfig, CONFIG_FILE_NAME};
pub use observer::{NoopObserver, ScanMetrics, ScanMetricsSnapshot, ScanObserver};
pub use resolve::{resolve_row, RowResolution, WritePointer};
pub use result::{RowResult, ScanPage};
pub use schema_guard::{is_transactional, lock_family, SchemaGuard};
pub use snapshot_scan::{ScanState, SnapshotScanner};
pub use txn_region::{snapshot_ts_of, with_snapshot, TxnRegion, TxnScanner};
