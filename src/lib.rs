//! strata-txn - Snapshot-isolation reads for transactional column-family tables
//!
//! Tables opt in by marking a column family with `TXN_ENABLE=true`. The schema
//! guard then reserves the lock family `L` and keeps every version, so a
//! reader holding a snapshot timestamp can see exactly what was committed
//! before it.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use strata_txn::{with_snapshot, MemRegion, Scan, SchemaGuard, TxnRegion};
//!
//! let mut table = /* TableDescriptor with a TXN_ENABLE family */;
//! SchemaGuard::new().prepare_table(&mut table)?;
//!
//! let region = TxnRegion::new(Arc::new(MemRegion::new(table)));
//! let mut scanner = region.scan_open(&with_snapshot(Scan::new(), start_ts))?;
//! let page = scanner.next_page(100)?;
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: cells, scans, descriptors, the column layout and the
//!   `Region` seam
//! - `strata-storage`: `MemRegion`, an in-memory region backend
//! - `strata-engine`: the schema guard, snapshot scanner and `TxnRegion`

pub use strata_core::*;
pub use strata_engine::*;
pub use strata_storage::{FaultPlan, MemRegion};
