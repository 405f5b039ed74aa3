//! Physical layout of transactional metadata
//!
//! Every data column `(family, qualifier)` has two kinds of shadow columns:
//!
//! - **Lock column**: family `L`, qualifier `family#qualifier`. A cell here at
//!   timestamp `start_ts` is an unresolved intent.
//! - **Write columns**: same family, qualifier `qualifier#p` (PUT) or
//!   `qualifier#d` (DELETE). A cell here at timestamp `commit_ts` holds the
//!   8-byte big-endian `start_ts` of the data cell it commits.
//!
//! The `#` byte is reserved: family names of transactional tables and user
//! qualifiers read through the transactional path must not contain it,
//! otherwise a data qualifier could be mistaken for a write column or one
//! family's lock prefix could cover another family's locks.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{StrataError, StrataResult};
use crate::types::{escape_bytes, Column};

/// Reserved family holding lock cells
pub const LOCK_FAMILY: &[u8] = b"L";

/// [`LOCK_FAMILY`] as a string
pub const LOCK_FAMILY_STR: &str = "L";

/// Separator between encoded column parts
pub const SEPARATOR: u8 = b'#';

/// Qualifier suffix of PUT write columns
pub const PUT_SUFFIX: &[u8] = b"#p";

/// Qualifier suffix of DELETE write columns
pub const DELETE_SUFFIX: &[u8] = b"#d";

/// Scan attribute carrying the snapshot timestamp
pub const SNAPSHOT_TS_ATTRIBUTE: &str = "_txnStartTs_";

/// Width of an encoded timestamp
pub const TIMESTAMP_LEN: usize = 8;

/// Kind of committed write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteType {
    /// The write made a value visible
    Put,
    /// The write removed the value
    Delete,
}

impl WriteType {
    /// Qualifier suffix identifying this write type
    pub fn suffix(self) -> &'static [u8] {
        match self {
            WriteType::Put => PUT_SUFFIX,
            WriteType::Delete => DELETE_SUFFIX,
        }
    }
}

/// True if `family` is the reserved lock family
pub fn is_lock_family(family: &[u8]) -> bool {
    family == LOCK_FAMILY
}

/// Reject qualifiers that would collide with the metadata encoding
pub fn check_data_qualifier(qualifier: &[u8]) -> StrataResult<()> {
    if qualifier.contains(&SEPARATOR) {
        return Err(StrataError::configuration(format!(
            "qualifier '{}' contains reserved byte '#'",
            escape_bytes(qualifier)
        )));
    }
    Ok(())
}

/// Reject family names that would make lock qualifiers ambiguous
///
/// The lock prefix of family `a` is `a#`, which would also cover every lock
/// of a family named `a#b`.
pub fn check_data_family(family: &[u8]) -> StrataResult<()> {
    if family.contains(&SEPARATOR) {
        return Err(StrataError::configuration(format!(
            "family '{}' contains reserved byte '#'",
            escape_bytes(family)
        )));
    }
    Ok(())
}

/// Prefix shared by every lock qualifier of a data family
pub fn lock_qualifier_prefix(family: &[u8]) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(family.len() + 1);
    prefix.extend_from_slice(family);
    prefix.push(SEPARATOR);
    prefix
}

/// Lock column guarding a data column
pub fn lock_column(data: &Column) -> Column {
    let mut qualifier = lock_qualifier_prefix(&data.family);
    qualifier.extend_from_slice(&data.qualifier);
    Column::new(LOCK_FAMILY, qualifier)
}

/// Data column guarded by a lock column
///
/// Returns `None` if the column is not a well-formed lock column.
pub fn data_column_of_lock(lock: &Column) -> Option<Column> {
    if !is_lock_family(&lock.family) {
        return None;
    }
    let split = lock.qualifier.iter().position(|&b| b == SEPARATOR)?;
    Some(Column::new(
        &lock.qualifier[..split],
        &lock.qualifier[split + 1..],
    ))
}

/// Write column for a data column
pub fn write_column(data: &Column, write_type: WriteType) -> Column {
    let mut qualifier = data.qualifier.clone();
    qualifier.extend_from_slice(write_type.suffix());
    Column::new(data.family.clone(), qualifier)
}

/// Split a write column into its data column and write type
///
/// Returns `None` for lock columns and for columns without a write suffix.
pub fn parse_write_column(column: &Column) -> Option<(Column, WriteType)> {
    if is_lock_family(&column.family) {
        return None;
    }
    [WriteType::Put, WriteType::Delete]
        .into_iter()
        .find(|t| column.qualifier.ends_with(t.suffix()))
        .map(|t| {
            let end = column.qualifier.len() - t.suffix().len();
            (
                Column::new(column.family.clone(), &column.qualifier[..end]),
                t,
            )
        })
}

/// Encode a timestamp as 8 big-endian bytes
pub fn encode_timestamp(ts: u64) -> [u8; TIMESTAMP_LEN] {
    let mut buf = [0u8; TIMESTAMP_LEN];
    BigEndian::write_u64(&mut buf, ts);
    buf
}

/// Decode an 8-byte big-endian timestamp
pub fn decode_timestamp(bytes: &[u8]) -> StrataResult<u64> {
    if bytes.len() != TIMESTAMP_LEN {
        return Err(StrataError::codec(format!(
            "timestamp must be {} bytes, got {}",
            TIMESTAMP_LEN,
            bytes.len()
        )));
    }
    Ok(BigEndian::read_u64(bytes))
}
