// Configuration: YAML file, environment overrides, defaults

use crate::models::STUDENTS_KEY;
use crate::storage::{FileStorage, KeyValueStorage, SqliteStorage, validate_key};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const APP_DIR: &str = "roster";
const CONFIG_FILENAME: &str = "roster.yml";
const DB_FILENAME: &str = "roster.db";

pub const ENV_DATA_DIR: &str = "ROSTER_DATA_DIR";
pub const ENV_BACKEND: &str = "ROSTER_BACKEND";

/// Which key-value backend persists the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per key in the data directory
    #[default]
    File,
    /// Key-value table in `roster.db`
    Sqlite,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::File => write!(f, "file"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Backend {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Backend::File),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(eyre!("Unknown backend: {} (expected file or sqlite)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding persisted state
    pub data_dir: PathBuf,

    pub backend: Backend,

    /// Key the roster is persisted under
    pub storage_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: Backend::default(),
            storage_key: STUDENTS_KEY.to_string(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".roster"))
}

/// Default config file location, e.g. `~/.config/roster/roster.yml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILENAME))
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present, otherwise built-in defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(file = ?path, "Loaded config file");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        Ok(config)
    }

    /// Apply overrides looked up through `lookup` (the process environment in `load`)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.is_empty()) {
            self.backend = backend.parse().with_context(|| format!("Invalid {}", ENV_BACKEND))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_key(&self.storage_key).context("Invalid storage_key in config")
    }

    /// Open the configured storage backend
    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStorage>> {
        debug!(backend = %self.backend, dir = ?self.data_dir, "Opening storage");
        let storage: Box<dyn KeyValueStorage> = match self.backend {
            Backend::File => Box::new(FileStorage::open(&self.data_dir)?),
            Backend::Sqlite => Box::new(SqliteStorage::open(self.data_dir.join(DB_FILENAME))?),
        };
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::File);
        assert_eq!(config.storage_key, STUDENTS_KEY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = Config::from_yaml("backend: sqlite\n").unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.storage_key, STUDENTS_KEY);
    }

    #[test]
    fn test_from_yaml_full() {
        let config = Config::from_yaml("data_dir: /tmp/roster\nbackend: file\nstorage_key: class-b\n").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/roster"));
        assert_eq!(config.storage_key, "class-b");
    }

    #[test]
    fn test_from_yaml_empty_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_from_yaml_rejects_unknown_backend() {
        assert!(Config::from_yaml("backend: redis\n").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("missing.yml"))).is_err());
    }

    #[test]
    fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("roster.yml");
        fs::write(&path, "storage_key: my-roster\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.storage_key, "my-roster");
    }

    #[test]
    fn test_apply_env_overrides() {
        let env: HashMap<&str, &str> = [(ENV_DATA_DIR, "/srv/roster"), (ENV_BACKEND, "SQLite")].into();
        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/roster"));
        assert_eq!(config.backend, Backend::Sqlite);
    }

    #[test]
    fn test_apply_env_bad_backend() {
        let mut config = Config::default();
        let result = config.apply_env(|k| (k == ENV_BACKEND).then(|| "tape".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_key() {
        let config = Config {
            storage_key: "../oops".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_open_storage_backends() {
        let temp = TempDir::new().unwrap();
        for backend in [Backend::File, Backend::Sqlite] {
            let config = Config {
                data_dir: temp.path().join(backend.to_string()),
                backend,
                ..Config::default()
            };
            let mut storage = config.open_storage().unwrap();
            storage.set_item("k", "v").unwrap();
            assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        }
        assert!(temp.path().join("sqlite").join(DB_FILENAME).exists());
        assert!(temp.path().join("file").join("k.json").exists());
    }
}
