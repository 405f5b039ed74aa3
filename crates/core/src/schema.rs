//! Table and column family descriptors
//!
//! A `TableDescriptor` is the pending definition handed to table creation.
//! Each `ColumnFamilyDescriptor` carries the storage policy the region
//! enforces for that family: how many versions per column survive, how long
//! cells live, and whether the family is kept hot in memory.
//!
//! Families also carry free-form string attributes. The transactional
//! protocol is opted into through the `TXN_ENABLE` attribute.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::escape_bytes;

/// Versions kept per column when the user does not say otherwise
pub const DEFAULT_VERSIONS: u32 = 3;

/// Marker for "keep every version"
pub const UNBOUNDED_VERSIONS: u32 = u32::MAX;

/// Family attribute that enrolls a table in the transactional protocol
pub const TXN_ENABLE_KEY: &str = "TXN_ENABLE";

/// Storage policy and attributes of one column family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFamilyDescriptor {
    name: Vec<u8>,
    max_versions: u32,
    ttl: Option<Duration>,
    in_memory: bool,
    attributes: BTreeMap<String, String>,
}

impl ColumnFamilyDescriptor {
    /// Family with default policy: 3 versions, no TTL, not in memory
    pub fn new(name: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            max_versions: DEFAULT_VERSIONS,
            ttl: None,
            in_memory: false,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the number of versions kept per column
    pub fn with_max_versions(mut self, versions: u32) -> Self {
        self.set_max_versions(versions);
        self
    }

    /// Expire cells older than `ttl`
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.set_ttl(Some(ttl));
        self
    }

    /// Keep the family in memory
    pub fn with_in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Attach a string attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Family name
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Family name rendered for messages
    pub fn name_str(&self) -> String {
        escape_bytes(&self.name)
    }

    /// Versions kept per column
    pub fn max_versions(&self) -> u32 {
        self.max_versions
    }

    /// Overwrite the versions kept per column (minimum 1)
    pub fn set_max_versions(&mut self, versions: u32) {
        self.max_versions = versions.max(1);
    }

    /// Time-to-live; `None` means cells never expire
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Overwrite the time-to-live
    pub fn set_ttl(&mut self, ttl: Option<Duration>) {
        self.ttl = ttl;
    }

    /// In-memory placement hint
    pub fn in_memory(&self) -> bool {
        self.in_memory
    }

    /// Look up a string attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether the family opts into transactions
    ///
    /// The attribute value is compared case-insensitively against `true`;
    /// anything else counts as disabled.
    pub fn txn_enabled(&self) -> bool {
        self.attribute(TXN_ENABLE_KEY)
            .map_or(false, |v| v.eq_ignore_ascii_case("true"))
    }
}

/// Pending table definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: String,
    families: Vec<ColumnFamilyDescriptor>,
}

impl TableDescriptor {
    /// Table with no families
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            families: Vec::new(),
        }
    }

    /// Builder form of [`TableDescriptor::add_family`]
    pub fn with_family(mut self, family: ColumnFamilyDescriptor) -> Self {
        self.add_family(family);
        self
    }

    /// Add a family, replacing any existing family with the same name
    pub fn add_family(&mut self, family: ColumnFamilyDescriptor) {
        match self.families.iter_mut().find(|f| f.name == family.name) {
            Some(existing) => *existing = family,
            None => self.families.push(family),
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Families in declaration order
    pub fn families(&self) -> &[ColumnFamilyDescriptor] {
        &self.families
    }

    /// Mutable access to the families
    pub fn families_mut(&mut self) -> &mut [ColumnFamilyDescriptor] {
        &mut self.families
    }

    /// Look up a family by name
    pub fn family(&self, name: &[u8]) -> Option<&ColumnFamilyDescriptor> {
        self.families.iter().find(|f| f.name == name)
    }

    /// True if a family with this name exists
    pub fn has_family(&self, name: &[u8]) -> bool {
        self.family(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_defaults() {
        let cf = ColumnFamilyDescriptor::new("cf");
        assert_eq!(cf.max_versions(), DEFAULT_VERSIONS);
        assert!(cf.ttl().is_none());
        assert!(!cf.in_memory());
        assert!(!cf.txn_enabled());
    }

    #[test]
    fn test_txn_enabled_parsing() {
        let on = ColumnFamilyDescriptor::new("cf").with_attribute(TXN_ENABLE_KEY, "TRUE");
        assert!(on.txn_enabled());
        let off = ColumnFamilyDescriptor::new("cf").with_attribute(TXN_ENABLE_KEY, "false");
        assert!(!off.txn_enabled());
        let junk = ColumnFamilyDescriptor::new("cf").with_attribute(TXN_ENABLE_KEY, "yes");
        assert!(!junk.txn_enabled());
    }

    #[test]
    fn test_max_versions_floor() {
        let cf = ColumnFamilyDescriptor::new("cf").with_max_versions(0);
        assert_eq!(cf.max_versions(), 1);
    }

    #[test]
    fn test_add_family_replaces_same_name() {
        let mut table = TableDescriptor::new("t").with_family(ColumnFamilyDescriptor::new("cf"));
        table.add_family(ColumnFamilyDescriptor::new("cf").with_in_memory(true));
        assert_eq!(table.families().len(), 1);
        assert!(table.family(b"cf").unwrap().in_memory());
        assert!(!table.has_family(b"other"));
    }
}
