//! Pure resolution of one row's lock and write cells
//!
//! Given the metadata cells a snapshot scan returned for a row, decide what
//! the row looks like at the snapshot:
//!
//! - any lock cell: the row is in conflict, the locks are the answer
//! - otherwise the PUT writes name the data versions to fetch
//! - no PUT writes: the row is deleted (or was never written) at the snapshot
//!
//! Nothing here touches storage, so the decision can be tested on fixed batches.

use std::collections::BTreeMap;

use strata_core::column::{decode_timestamp, is_lock_family, parse_write_column};
use strata_core::{escape_bytes, Cell, Column, Get, StrataError, StrataResult, WriteType};
use tracing::debug;

/// A committed PUT pointing at a data version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePointer {
    /// Data column the write commits
    pub column: Column,
    /// Timestamp of the write cell
    pub commit_ts: u64,
    /// Timestamp of the data cell it points at
    pub start_ts: u64,
}

/// What a row resolves to at the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowResolution {
    /// Lock cells present; returned as-is
    Conflict(Vec<Cell>),
    /// Nothing visible
    Tombstoned,
    /// Data versions to fetch
    Fetch(Vec<WritePointer>),
}

/// Split a row batch into (lock cells, write cells) by family
pub fn partition(cells: Vec<Cell>) -> (Vec<Cell>, Vec<Cell>) {
    cells.into_iter().partition(|c| is_lock_family(&c.family))
}

/// Decide what a row's metadata cells mean
///
/// When a data column has both a PUT and a DELETE write visible, the one
/// with the higher commit timestamp decides.
///
/// # Errors
///
/// Returns a codec error if a winning PUT write carries a malformed pointer.
pub fn resolve_row(cells: Vec<Cell>) -> StrataResult<RowResolution> {
    let (locks, writes) = partition(cells);
    if !locks.is_empty() {
        return Ok(RowResolution::Conflict(locks));
    }

    let mut latest: BTreeMap<Column, (WriteType, Cell)> = BTreeMap::new();
    for cell in writes {
        let Some((column, write_type)) = parse_write_column(&cell.column()) else {
            debug!(
                target: "strata::txn",
                row = %escape_bytes(&cell.row),
                column = %cell.column(),
                "Ignoring non-metadata cell in snapshot batch"
            );
            continue;
        };
        match latest.get(&column) {
            Some((_, seen)) if seen.timestamp >= cell.timestamp => {}
            _ => {
                latest.insert(column, (write_type, cell));
            }
        }
    }

    let mut pointers = Vec::new();
    for (column, (write_type, cell)) in latest {
        if write_type == WriteType::Delete {
            continue;
        }
        let start_ts = decode_timestamp(&cell.value).map_err(|e| {
            StrataError::codec(format!(
                "bad write pointer at row '{}' column {}: {}",
                escape_bytes(&cell.row),
                cell.column(),
                e
            ))
        })?;
        pointers.push(WritePointer {
            column,
            commit_ts: cell.timestamp,
            start_ts,
        });
    }

    if pointers.is_empty() {
        Ok(RowResolution::Tombstoned)
    } else {
        Ok(RowResolution::Fetch(pointers))
    }
}

/// Point lookup fetching every pointed-to data version of a row
pub fn data_get(row: &[u8], pointers: &[WritePointer]) -> Get {
    pointers.iter().fold(Get::new(row), |get, p| {
        get.add_version(p.column.clone(), p.start_ts)
    })
}
