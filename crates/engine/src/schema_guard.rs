//! Table-creation guard for transactional tables
//!
//! A table is transactional as soon as one of its families sets
//! `TXN_ENABLE=true`. For such tables the guard:
//!
//! 1. refuses a user family named like the reserved lock family
//! 2. refuses any family with a finite TTL
//! 3. refuses any family with an explicit, bounded max-versions, then forces
//!    every family to unbounded versions
//! 4. adds the lock family (in memory, 1 version, no TTL)
//!
//! Snapshot reads depend on old versions staying readable until a
//! transaction-aware cleaner decides otherwise, so age- and count-based
//! eviction must be off.

use strata_core::column::{check_data_family, LOCK_FAMILY, LOCK_FAMILY_STR};
use strata_core::{
    ColumnFamilyDescriptor, StrataError, StrataResult, TableDescriptor, DEFAULT_VERSIONS,
    TXN_ENABLE_KEY, UNBOUNDED_VERSIONS,
};
use tracing::info;

/// Validates and rewrites table definitions before creation
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaGuard;

impl SchemaGuard {
    /// Create a guard
    pub fn new() -> Self {
        Self
    }

    /// Prepare a pending table definition for creation
    ///
    /// Non-transactional tables pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a family collides with the lock
    /// family or sets TTL or max versions on a transactional table. The
    /// descriptor is left unmodified in that case.
    pub fn prepare_table(&self, table: &mut TableDescriptor) -> StrataResult<()> {
        if !is_transactional(table) {
            return Ok(());
        }

        for family in table.families() {
            check_family(family)?;
        }
        for family in table.families_mut() {
            family.set_max_versions(UNBOUNDED_VERSIONS);
        }
        table.add_family(lock_family());

        info!(
            target: "strata::schema",
            table = table.name(),
            family = LOCK_FAMILY_STR,
            "Added lock family to transactional table"
        );
        Ok(())
    }
}

/// True if any family opts into transactions
pub fn is_transactional(table: &TableDescriptor) -> bool {
    table.families().iter().any(ColumnFamilyDescriptor::txn_enabled)
}

/// Descriptor of the reserved lock family
pub fn lock_family() -> ColumnFamilyDescriptor {
    ColumnFamilyDescriptor::new(LOCK_FAMILY)
        .with_in_memory(true)
        .with_max_versions(1)
}

fn check_family(family: &ColumnFamilyDescriptor) -> StrataResult<()> {
    if family.name() == LOCK_FAMILY {
        return Err(StrataError::configuration(format!(
            "reserved family name collision: family '{}' is reserved when {} is true, \
             please change your family name",
            LOCK_FAMILY_STR, TXN_ENABLE_KEY
        )));
    }
    check_data_family(family.name())?;
    if let Some(ttl) = family.ttl() {
        return Err(StrataError::configuration(format!(
            "can not set TTL for family '{}' when {} is true, TTL={}s",
            family.name_str(),
            TXN_ENABLE_KEY,
            ttl.as_secs()
        )));
    }
    let versions = family.max_versions();
    if versions != DEFAULT_VERSIONS && versions != UNBOUNDED_VERSIONS {
        return Err(StrataError::configuration(format!(
            "can not set MaxVersions for family '{}' when {} is true, MaxVersions={}",
            family.name_str(),
            TXN_ENABLE_KEY,
            versions
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn txn_family(name: &str) -> ColumnFamilyDescriptor {
        ColumnFamilyDescriptor::new(name).with_attribute(TXN_ENABLE_KEY, "true")
    }

    #[test]
    fn test_plain_table_passes_through() {
        let original = TableDescriptor::new("t")
            .with_family(ColumnFamilyDescriptor::new("cf").with_ttl(Duration::from_secs(5)));
        let mut table = original.clone();
        SchemaGuard::new().prepare_table(&mut table).unwrap();
        assert_eq!(table, original);
    }

    #[test]
    fn test_disabled_marker_passes_through() {
        let original = TableDescriptor::new("t").with_family(
            ColumnFamilyDescriptor::new("L").with_attribute(TXN_ENABLE_KEY, "false"),
        );
        let mut table = original.clone();
        SchemaGuard::new().prepare_table(&mut table).unwrap();
        assert_eq!(table, original);
    }

    #[test]
    fn test_lock_family_injected() {
        let mut table = TableDescriptor::new("orders").with_family(txn_family("cf"));
        SchemaGuard::new().prepare_table(&mut table).unwrap();

        let lock = table.family(LOCK_FAMILY).expect("lock family added");
        assert!(lock.in_memory());
        assert_eq!(lock.max_versions(), 1);
        assert!(lock.ttl().is_none());

        let cf = table.family(b"cf").unwrap();
        assert_eq!(cf.max_versions(), UNBOUNDED_VERSIONS);
        assert!(cf.ttl().is_none());
    }

    #[test]
    fn test_reserved_name_rejected() {
        let mut table = TableDescriptor::new("t")
            .with_family(txn_family("cf"))
            .with_family(ColumnFamilyDescriptor::new("L"));
        let err = SchemaGuard::new().prepare_table(&mut table).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("reserved family name collision"));
    }

    #[test]
    fn test_separator_in_family_name_rejected() {
        let original = TableDescriptor::new("t")
            .with_family(txn_family("a"))
            .with_family(ColumnFamilyDescriptor::new("a#b"));
        let mut table = original.clone();
        let err = SchemaGuard::new().prepare_table(&mut table).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("a#b"));
        assert_eq!(table, original);
    }

    #[test]
    fn test_ttl_rejected_on_any_family() {
        let mut table = TableDescriptor::new("t")
            .with_family(txn_family("cf"))
            .with_family(ColumnFamilyDescriptor::new("other").with_ttl(Duration::from_secs(60)));
        let err = SchemaGuard::new().prepare_table(&mut table).unwrap_err();
        assert!(err.to_string().contains("TTL"));
    }

    #[test]
    fn test_explicit_max_versions_rejected() {
        let mut table =
            TableDescriptor::new("t").with_family(txn_family("cf").with_max_versions(5));
        let err = SchemaGuard::new().prepare_table(&mut table).unwrap_err();
        assert!(err.to_string().contains("MaxVersions=5"));
        assert!(!table.has_family(LOCK_FAMILY));
    }

    #[test]
    fn test_unbounded_max_versions_accepted() {
        let mut table = TableDescriptor::new("t")
            .with_family(txn_family("cf").with_max_versions(UNBOUNDED_VERSIONS));
        SchemaGuard::new().prepare_table(&mut table).unwrap();
        assert!(table.has_family(LOCK_FAMILY));
    }

    #[test]
    fn test_every_family_forced_unbounded() {
        let mut table = TableDescriptor::new("t")
            .with_family(txn_family("cf"))
            .with_family(ColumnFamilyDescriptor::new("plain"));
        SchemaGuard::new().prepare_table(&mut table).unwrap();
        assert_eq!(
            table.family(b"plain").unwrap().max_versions(),
            UNBOUNDED_VERSIONS
        );
    }
}
