// Configuration for the luxetasks CLI

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::filter::SortOrder;
use crate::store::DEFAULT_KEY;

/// Settings read from `config.yml`
///
/// Every field is optional in the file; missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the slot files
    pub data_dir: PathBuf,
    /// Slot key the task list is stored under
    pub storage_key: String,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Sort order for `list` when none is given
    pub default_sort: SortOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_KEY.to_string(),
            log_level: "warn".to_string(),
            default_sort: SortOrder::Date,
        }
    }
}

impl Config {
    /// Load from `path`, or return defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse YAML config")
    }

    /// Default config location: `<data_dir>/config.yml`
    pub fn default_path() -> PathBuf {
        default_data_dir().join("config.yml")
    }
}

/// Platform data directory, or `./.luxetasks` when there is none
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("luxetasks"))
        .unwrap_or_else(|| PathBuf::from(".luxetasks"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage_key, "luxe-tasks");
        assert_eq!(config.default_sort, SortOrder::Date);
        assert!(config.data_dir.ends_with("luxetasks") || config.data_dir.ends_with(".luxetasks"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("config.yml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "storage_key: work-tasks\ndefault_sort: priority\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage_key, "work-tasks");
        assert_eq!(config.default_sort, SortOrder::Priority);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_load_full_file() {
        let yaml = "data_dir: /tmp/tasks\nstorage_key: t\nlog_level: debug\ndefault_sort: name\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/tasks"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.default_sort, SortOrder::Name);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::from_yaml("default_sort: sideways\n").is_err());
        assert!(Config::from_yaml("storage_key: [unclosed").is_err());
    }
}
