//! Core types and traits for Strata transactional tables
//!
//! This crate defines the foundational types used throughout the system:
//! - Cell / Column: versioned cells addressed by (row, family, qualifier, ts)
//! - Scan / Get: range and exact-version read requests
//! - Filter: row- and cell-level predicates
//! - TableDescriptor: table and column family definitions with storage policy
//! - column: physical layout of lock and write metadata
//! - Error: error type hierarchy
//! - Traits: the `Region` abstraction over the storage engine

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod column;
pub mod error;
pub mod filter;
pub mod schema;
pub mod traits;
pub mod types;

pub use column::{WriteType, LOCK_FAMILY, LOCK_FAMILY_STR, SNAPSHOT_TS_ATTRIBUTE};
pub use error::{StrataError, StrataResult};
pub use filter::Filter;
pub use schema::{
    ColumnFamilyDescriptor, TableDescriptor, DEFAULT_VERSIONS, TXN_ENABLE_KEY, UNBOUNDED_VERSIONS,
};
pub use traits::{Region, RegionScanner, RowBatch};
pub use types::{escape_bytes, Cell, Column, ColumnSelector, Get, Scan};
