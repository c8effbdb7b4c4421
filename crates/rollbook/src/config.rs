//! Configuration management for rollbook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "rollbook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "rollbook.db";

/// Default export file name.
pub const DEFAULT_EXPORT_FILENAME: &str = "export.csv";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROLLBOOK_`)
/// 2. TOML config file at `~/.config/rollbook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Violation type catalog configuration.
    pub catalog: CatalogConfig,
    /// First-run seed data.
    pub seed: SeedConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/rollbook/rollbook.db`
    pub database_path: Option<PathBuf>,
}

/// Violation type catalog configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Labels the catalog starts with when nothing is stored yet.
    pub default_types: Vec<String>,
}

/// Seed data used when a collection has never been stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Start with a handful of demo students.
    pub demo_students: bool,
}

/// Export-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory relative export paths resolve against.
    /// Defaults to the current directory.
    pub directory: Option<PathBuf>,
    /// File name used when none is given.
    pub default_filename: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_types: default_violation_types(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            default_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }
}

/// Violation types every new catalog starts with.
#[must_use]
pub fn default_violation_types() -> Vec<String> {
    vec![
        "Tidak memakai dasi".to_string(),
        "Tidak memakai sabuk".to_string(),
        "Rambut panjang".to_string(),
        "Tidak memakai ciput (siswi)".to_string(),
        "Berkelahi".to_string(),
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ROLLBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.default_types.is_empty() {
            return Err(Error::ConfigValidation {
                message: "catalog.default_types must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for label in &self.catalog.default_types {
            if label.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "catalog.default_types contains a blank label".to_string(),
                });
            }
            if !seen.insert(label.as_str()) {
                return Err(Error::ConfigValidation {
                    message: format!("catalog.default_types lists '{label}' twice"),
                });
            }
        }

        let has_csv_extension = Path::new(&self.export.default_filename)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !has_csv_extension {
            return Err(Error::ConfigValidation {
                message: format!(
                    "export.default_filename must end in .csv (got '{}')",
                    self.export.default_filename
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Resolve where an export should be written.
    ///
    /// Absolute paths are used as given; relative ones land in the configured
    /// export directory, if any.
    #[must_use]
    pub fn export_path(&self, file: Option<&Path>) -> PathBuf {
        let file = file.map_or_else(
            || PathBuf::from(&self.export.default_filename),
            Path::to_path_buf,
        );
        match &self.export.directory {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.catalog.default_types.len(), 5);
        assert!(!config.seed.demo_students);
        assert_eq!(config.export.default_filename, "export.csv");
        assert!(config.export.directory.is_none());
    }

    #[test]
    fn test_default_violation_types() {
        let types = default_violation_types();
        assert_eq!(types.len(), 5);
        assert_eq!(types[0], "Tidak memakai dasi");
        assert_eq!(types[4], "Berkelahi");
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_catalog() {
        let mut config = Config::default();
        config.catalog.default_types.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must not be empty"));
    }

    #[test]
    fn test_validate_blank_label() {
        let mut config = Config::default();
        config.catalog.default_types.push("   ".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("blank label"));
    }

    #[test]
    fn test_validate_duplicate_label() {
        let mut config = Config::default();
        config.catalog.default_types.push("Berkelahi".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("Berkelahi"));
    }

    #[test]
    fn test_validate_export_filename() {
        let mut config = Config::default();
        config.export.default_filename = "report.txt".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("report.txt"));

        config.export.default_filename = "REPORT.CSV".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("rollbook.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_export_path_defaults() {
        let config = Config::default();
        assert_eq!(config.export_path(None), PathBuf::from("export.csv"));
        assert_eq!(
            config.export_path(Some(Path::new("absen.csv"))),
            PathBuf::from("absen.csv")
        );
    }

    #[test]
    fn test_export_path_with_directory() {
        let mut config = Config::default();
        config.export.directory = Some(PathBuf::from("/srv/exports"));

        assert_eq!(
            config.export_path(None),
            PathBuf::from("/srv/exports/export.csv")
        );
        assert_eq!(
            config.export_path(Some(Path::new("/tmp/absen.csv"))),
            PathBuf::from("/tmp/absen.csv")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("rollbook"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
database_path = "/tmp/kelas.db"

[catalog]
default_types = ["Terlambat", "Bolos"]

[seed]
demo_students = true
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/kelas.db"));
        assert_eq!(config.catalog.default_types, vec!["Terlambat", "Bolos"]);
        assert!(config.seed.demo_students);
        assert_eq!(config.export.default_filename, "export.csv");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[catalog]\ndefault_types = []\n").unwrap();

        let result = Config::load_from(Some(path));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("default_types"));
        assert!(json.contains("demo_students"));
    }
}
