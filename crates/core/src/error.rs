//! Error types for the transactional read path
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! # Taxonomy
//!
//! - `Configuration`: the request itself is invalid (bad table definition,
//!   scanning a family that is not enrolled in transactions)
//! - `Inconsistency`: a committed write points at a data cell that is missing
//! - `Storage`: a failure reported by the underlying region, wrapped once
//! - `Codec`: a metadata payload that cannot be decoded
//!
//! A conflicting lock is not an error. It is returned as data.

use std::io;
use thiserror::Error;

use crate::types::escape_bytes;

/// Result type alias for transactional operations
pub type StrataResult<T> = std::result::Result<T, StrataError>;

/// Error types for the transactional read path
#[derive(Debug, Error)]
pub enum StrataError {
    /// Invalid or conflicting table/scan configuration
    #[error("configuration error: {message}")]
    Configuration {
        /// Human readable reason
        message: String,
    },

    /// A write record points at a data cell that does not exist
    #[error("inconsistent row '{}': {message}", escape_bytes(.row))]
    Inconsistency {
        /// Row key the inconsistency was found on
        row: Vec<u8>,
        /// Human readable reason
        message: String,
    },

    /// Failure from the underlying storage region
    #[error("storage error: {message}")]
    Storage {
        /// What the caller was doing when the failure occurred
        message: String,
        /// The wrapped failure, if any
        #[source]
        source: Option<Box<StrataError>>,
    },

    /// Malformed metadata payload
    #[error("codec error: {0}")]
    Codec(String),

    /// I/O error (config file access)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StrataError {
    /// Build a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        StrataError::Configuration {
            message: message.into(),
        }
    }

    /// Build an inconsistency error for a row
    pub fn inconsistency(row: &[u8], message: impl Into<String>) -> Self {
        StrataError::Inconsistency {
            row: row.to_vec(),
            message: message.into(),
        }
    }

    /// Wrap a region failure
    pub fn storage(message: impl Into<String>, source: StrataError) -> Self {
        StrataError::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// A storage failure with no underlying cause (raised by a region itself)
    pub fn storage_failure(message: impl Into<String>) -> Self {
        StrataError::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Build a codec error
    pub fn codec(message: impl Into<String>) -> Self {
        StrataError::Codec(message.into())
    }

    /// Whether retrying the same request at this layer can succeed.
    ///
    /// Nothing raised by the read path is retryable here: retry policy
    /// belongs to the coordinator above or the storage engine below.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// True for configuration errors
    pub fn is_configuration(&self) -> bool {
        matches!(self, StrataError::Configuration { .. })
    }

    /// True for storage errors
    pub fn is_storage(&self) -> bool {
        matches!(self, StrataError::Storage { .. })
    }
}
