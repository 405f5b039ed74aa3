//! Storage layer for Strata transactional tables
//!
//! This crate implements the in-memory reference region:
//! - MemRegion: BTreeMap-based region with RwLock and per-family retention
//! - Range scanners that re-seek per row and release on drop
//! - FaultPlan: armed failures for exercising error paths

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fault;
pub mod region;

pub use fault::FaultPlan;
pub use region::MemRegion;
