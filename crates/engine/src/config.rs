//! Read-path configuration via `strata-txn.toml`
//!
//! The file is optional. A missing field takes its default; a missing file can
//! be created with [`TxnConfig::write_default_if_missing`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_core::{StrataError, StrataResult};

/// Config file name placed next to the table data.
pub const CONFIG_FILE_NAME: &str = "strata-txn.toml";

/// Transactional read-path configuration.
///
/// # Example
///
/// ```toml
/// scan_batch_hint = 100
/// default_row_limit = 100
/// strict_data_lookup = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnConfig {
    /// Size hint passed to the internal metadata scanner on every advance.
    #[serde(default = "default_scan_batch_hint")]
    pub scan_batch_hint: usize,
    /// Row limit used by `next_page_default`.
    #[serde(default = "default_row_limit")]
    pub default_row_limit: usize,
    /// Fail the advance with an inconsistency error when a committed write
    /// points at a missing data cell, instead of skipping the row.
    #[serde(default)]
    pub strict_data_lookup: bool,
}

fn default_scan_batch_hint() -> usize {
    100
}

fn default_row_limit() -> usize {
    100
}

impl Default for TxnConfig {
    fn default() -> Self {
        Self {
            scan_batch_hint: default_scan_batch_hint(),
            default_row_limit: default_row_limit(),
            strict_data_lookup: false,
        }
    }
}

impl TxnConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a size is zero.
    pub fn validate(&self) -> StrataResult<()> {
        if self.scan_batch_hint == 0 {
            return Err(StrataError::configuration(
                "scan_batch_hint must be greater than 0",
            ));
        }
        if self.default_row_limit == 0 {
            return Err(StrataError::configuration(
                "default_row_limit must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strata transactional read-path configuration
#
# Size hint handed to the internal lock/write scanner per advance.
scan_batch_hint = 100

# Row limit used when a caller asks for a page without one.
default_row_limit = 100

# When true, a committed PUT whose data cell is missing fails the scan with
# an inconsistency error. When false (default) the row is skipped and logged.
strict_data_lookup = false
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> StrataResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TxnConfig = toml::from_str(&content).map_err(|e| {
            StrataError::configuration(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> StrataResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StrataResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            StrataError::configuration(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_toml_parses_to_default() {
        let config: TxnConfig = toml::from_str(TxnConfig::default_toml()).unwrap();
        assert_eq!(config, TxnConfig::default());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: TxnConfig = toml::from_str("strict_data_lookup = true").unwrap();
        assert!(config.strict_data_lookup);
        assert_eq!(config.scan_batch_hint, 100);
        assert_eq!(config.default_row_limit, 100);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let config = TxnConfig {
            scan_batch_hint: 0,
            ..TxnConfig::default()
        };
        assert!(config.validate().unwrap_err().is_configuration());

        let config = TxnConfig {
            default_row_limit: 0,
            ..TxnConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn write_default_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        TxnConfig::write_default_if_missing(&path).unwrap();
        assert_eq!(TxnConfig::from_file(&path).unwrap(), TxnConfig::default());
    }

    #[test]
    fn write_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "default_row_limit = 7\n").unwrap();

        TxnConfig::write_default_if_missing(&path).unwrap();
        assert_eq!(TxnConfig::from_file(&path).unwrap().default_row_limit, 7);
    }

    #[test]
    fn from_file_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "scan_batch_hint = 0\n").unwrap();
        assert!(TxnConfig::from_file(&path).is_err());

        std::fs::write(&path, "scan_batch_hint = \"lots\"\n").unwrap();
        assert!(TxnConfig::from_file(&path).unwrap_err().is_configuration());
    }

    #[test]
    fn from_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = TxnConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, StrataError::Io(_)));
    }

    #[test]
    fn write_to_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = TxnConfig {
            scan_batch_hint: 16,
            default_row_limit: 3,
            strict_data_lookup: true,
        };
        config.write_to_file(&path).unwrap();
        assert_eq!(TxnConfig::from_file(&path).unwrap(), config);
    }
}
