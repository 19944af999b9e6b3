use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cymi_store::{Backend, FileBackend, InMemoryBackend, SyncMode};

use crate::error::{DbError, DbResult};

/// Configuration for opening a database.
///
/// ```toml
/// [storage]
/// backend = "file"
/// path = "/var/lib/cymidb/db.log"
/// sync = "every_write"
///
/// [log]
/// level = "debug"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Where node and link rows are kept.
    pub storage: StorageConfig,
    /// Logging setup for [`crate::logging::init`].
    pub log: LogConfig,
}

impl DbConfig {
    /// Keep everything in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Persist to the log file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig::File {
                path: path.into(),
                sync: SyncMode::default(),
            },
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing sections take their defaults.
    pub fn from_toml_str(s: &str) -> DbResult<Self> {
        toml::from_str(s).map_err(|e| DbError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> DbResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Backing store selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Rows live in memory and are lost on close.
    #[default]
    Memory,
    /// Rows are appended to a log file.
    File {
        path: PathBuf,
        #[serde(default)]
        sync: SyncMode,
    },
}

impl StorageConfig {
    /// Open the configured backend.
    pub fn open(&self) -> DbResult<Box<dyn Backend>> {
        Ok(match self {
            Self::Memory => Box::new(InMemoryBackend::new()),
            Self::File { path, sync } => Box::new(FileBackend::open(path, *sync)?),
        })
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum level: `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DbConfig::default();
        assert_eq!(c.storage, StorageConfig::Memory);
        assert_eq!(c.log.level, "info");
    }

    #[test]
    fn parse_file_storage() {
        let c = DbConfig::from_toml_str(
            r#"
            [storage]
            backend = "file"
            path = "/tmp/cymi.log"
            sync = "every_write"

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(
            c.storage,
            StorageConfig::File {
                path: PathBuf::from("/tmp/cymi.log"),
                sync: SyncMode::EveryWrite,
            }
        );
        assert_eq!(c.log.level, "debug");
    }

    #[test]
    fn missing_sections_take_defaults() {
        let c = DbConfig::from_toml_str("[storage]\nbackend = \"file\"\npath = \"db.log\"\n")
            .unwrap();
        assert!(matches!(
            c.storage,
            StorageConfig::File {
                sync: SyncMode::OsDefault,
                ..
            }
        ));
        assert_eq!(c.log, LogConfig::default());
        assert_eq!(DbConfig::from_toml_str("").unwrap(), DbConfig::default());
    }

    #[test]
    fn malformed_config_is_config_error() {
        let err = DbConfig::from_toml_str("[storage]\nbackend = \"tape\"\n").unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cymi.toml");
        fs::write(&path, "[log]\nlevel = \"warn\"\n").unwrap();
        let c = DbConfig::load(&path).unwrap();
        assert_eq!(c.log.level, "warn");
        assert_eq!(c.storage, StorageConfig::Memory);
    }

    #[test]
    fn open_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::file(dir.path().join("db.log"));
        let backend = config.storage.open().unwrap();
        assert!(backend.first_node().unwrap().is_none());
    }
}
