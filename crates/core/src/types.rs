//! Core types for the versioned column store
//!
//! This module defines the foundational types:
//! - Column: (family, qualifier) address inside a row
//! - Cell: a single versioned value at (row, family, qualifier, timestamp)
//! - Scan: a range read request with column selection and a time bound
//! - Get: a point lookup of exact cell versions within one row

use rustc_hash::FxHashMap;
use std::fmt;
use std::fmt::Write as _;

use crate::filter::Filter;

/// Render a byte string for logs and error messages
///
/// Printable ASCII is kept as-is, everything else is written as `\xNN`.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b.is_ascii_graphic() || b == b' ' {
            out.push(b as char);
        } else {
            let _ = write!(out, "\\x{:02X}", b);
        }
    }
    out
}

/// Address of a column inside a row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column {
    /// Column family name
    pub family: Vec<u8>,
    /// Qualifier within the family
    pub qualifier: Vec<u8>,
}

impl Column {
    /// Create a column address
    pub fn new(family: impl Into<Vec<u8>>, qualifier: impl Into<Vec<u8>>) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            escape_bytes(&self.family),
            escape_bytes(&self.qualifier)
        )
    }
}

/// A single versioned cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Row key
    pub row: Vec<u8>,
    /// Column family name
    pub family: Vec<u8>,
    /// Qualifier within the family
    pub qualifier: Vec<u8>,
    /// Cell version
    pub timestamp: u64,
    /// Opaque payload
    pub value: Vec<u8>,
}

impl Cell {
    /// Create a cell
    pub fn new(
        row: impl Into<Vec<u8>>,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        timestamp: u64,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp,
            value: value.into(),
        }
    }

    /// The (family, qualifier) address of this cell
    pub fn column(&self) -> Column {
        Column::new(self.family.clone(), self.qualifier.clone())
    }
}

/// Which columns of a row a scan returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// Every qualifier of a family
    Family(Vec<u8>),
    /// One exact column
    Column(Column),
    /// Qualifiers of `family` starting with `prefix`
    QualifierPrefix {
        /// Family to select from
        family: Vec<u8>,
        /// Required qualifier prefix
        prefix: Vec<u8>,
    },
    /// Qualifiers of `family` ending with any of `suffixes`
    QualifierSuffix {
        /// Family to select from
        family: Vec<u8>,
        /// Accepted qualifier suffixes
        suffixes: Vec<Vec<u8>>,
    },
}

impl ColumnSelector {
    /// Family this selector reads from
    pub fn family(&self) -> &[u8] {
        match self {
            ColumnSelector::Family(family) => family,
            ColumnSelector::Column(column) => &column.family,
            ColumnSelector::QualifierPrefix { family, .. } => family,
            ColumnSelector::QualifierSuffix { family, .. } => family,
        }
    }

    /// Check whether a (family, qualifier) pair is selected
    pub fn matches(&self, family: &[u8], qualifier: &[u8]) -> bool {
        if self.family() != family {
            return false;
        }
        match self {
            ColumnSelector::Family(_) => true,
            ColumnSelector::Column(column) => column.qualifier == qualifier,
            ColumnSelector::QualifierPrefix { prefix, .. } => qualifier.starts_with(prefix),
            ColumnSelector::QualifierSuffix { suffixes, .. } => {
                suffixes.iter().any(|s| qualifier.ends_with(s))
            }
        }
    }
}

/// Range read request
///
/// Empty `start_row`/`stop_row` mean unbounded. `start_row` is inclusive,
/// `stop_row` exclusive. An empty column list selects every family.
#[derive(Debug, Clone)]
pub struct Scan {
    start_row: Vec<u8>,
    stop_row: Vec<u8>,
    columns: Vec<ColumnSelector>,
    max_timestamp: Option<u64>,
    max_versions: u32,
    filter: Option<Filter>,
    attributes: FxHashMap<String, Vec<u8>>,
}

impl Scan {
    /// Full-table scan returning the latest version of every column
    pub fn new() -> Self {
        Self {
            start_row: Vec::new(),
            stop_row: Vec::new(),
            columns: Vec::new(),
            max_timestamp: None,
            max_versions: 1,
            filter: None,
            attributes: FxHashMap::default(),
        }
    }

    /// Scan covering exactly one row
    pub fn single_row(row: &[u8]) -> Self {
        let mut stop = row.to_vec();
        stop.push(0);
        Self::new().with_start_row(row).with_stop_row(stop)
    }

    /// Set the inclusive start row
    pub fn with_start_row(mut self, row: impl Into<Vec<u8>>) -> Self {
        self.start_row = row.into();
        self
    }

    /// Set the exclusive stop row
    pub fn with_stop_row(mut self, row: impl Into<Vec<u8>>) -> Self {
        self.stop_row = row.into();
        self
    }

    /// Select a whole family
    pub fn add_family(self, family: impl Into<Vec<u8>>) -> Self {
        self.with_selector(ColumnSelector::Family(family.into()))
    }

    /// Select one column
    pub fn add_column(self, family: impl Into<Vec<u8>>, qualifier: impl Into<Vec<u8>>) -> Self {
        self.with_selector(ColumnSelector::Column(Column::new(family, qualifier)))
    }

    /// Add an arbitrary column selector
    pub fn with_selector(mut self, selector: ColumnSelector) -> Self {
        self.columns.push(selector);
        self
    }

    /// Only return versions at or below `ts`
    pub fn with_max_timestamp(mut self, ts: u64) -> Self {
        self.max_timestamp = Some(ts);
        self
    }

    /// Number of versions per column to return (at least 1)
    pub fn with_max_versions(mut self, versions: u32) -> Self {
        self.max_versions = versions.max(1);
        self
    }

    /// Attach a filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Attach a request attribute
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Builder form of [`Scan::set_attribute`]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Look up a request attribute
    pub fn attribute(&self, name: &str) -> Option<&[u8]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    /// Inclusive start row (empty = unbounded)
    pub fn start_row(&self) -> &[u8] {
        &self.start_row
    }

    /// Exclusive stop row (empty = unbounded)
    pub fn stop_row(&self) -> &[u8] {
        &self.stop_row
    }

    /// Column selectors (empty = all families)
    pub fn columns(&self) -> &[ColumnSelector] {
        &self.columns
    }

    /// Inclusive upper timestamp bound
    pub fn max_timestamp(&self) -> Option<u64> {
        self.max_timestamp
    }

    /// Versions returned per column
    pub fn max_versions(&self) -> u32 {
        self.max_versions
    }

    /// Attached filter
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Distinct families named by the selectors, in first-seen order
    pub fn families(&self) -> Vec<&[u8]> {
        let mut families: Vec<&[u8]> = Vec::new();
        for selector in &self.columns {
            let family = selector.family();
            if !families.contains(&family) {
                families.push(family);
            }
        }
        families
    }

    /// True if `row` is not past the stop row
    pub fn before_stop(&self, row: &[u8]) -> bool {
        self.stop_row.is_empty() || row < self.stop_row.as_slice()
    }

    /// True if `row` lies in `[start_row, stop_row)`
    pub fn contains_row(&self, row: &[u8]) -> bool {
        row >= self.start_row.as_slice() && self.before_stop(row)
    }

    /// True if the column is selected (an empty selection matches everything)
    pub fn selects(&self, family: &[u8], qualifier: &[u8]) -> bool {
        self.columns.is_empty() || self.columns.iter().any(|s| s.matches(family, qualifier))
    }
}

impl Default for Scan {
    fn default() -> Self {
        Self::new()
    }
}

/// Point lookup of exact cell versions within one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Get {
    /// Row to read
    pub row: Vec<u8>,
    /// Columns with the exact version to fetch for each
    pub lookups: Vec<(Column, u64)>,
}

impl Get {
    /// Empty lookup for a row
    pub fn new(row: impl Into<Vec<u8>>) -> Self {
        Self {
            row: row.into(),
            lookups: Vec::new(),
        }
    }

    /// Request `column` at exactly `timestamp`
    pub fn add_version(mut self, column: Column, timestamp: u64) -> Self {
        self.lookups.push((column, timestamp));
        self
    }

    /// Number of requested versions
    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    /// True if nothing is requested
    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }
}
