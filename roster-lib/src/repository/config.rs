use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::fs::{config_dir, state_dir};

const CURRENT_CONFIG_VERSION: u16 = 1;
const FILE_NAME: &str = "core.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not access configuration: {0}")]
    Io(#[from] io::Error),
    #[error("Could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The backend's core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default = "current_version")]
    pub version: u16,
    #[serde(default)]
    pub store: StoreConfig,
}

fn current_version() -> u16 {
    CURRENT_CONFIG_VERSION
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            store: StoreConfig::default(),
        }
    }
}

/// Which backend holds the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Embedded database on this machine
    Local {
        /// Defaults to `users.db` in the state directory
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// Hosted PostgREST endpoint
    Rest(RestConfig),
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Local { path: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestConfig {
    /// Project URL, without the `/rest/v1` suffix
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    /// Request timeout. No timeout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_table() -> String {
    "users".into()
}

impl CoreConfig {
    /// Load the configuration from the default location, writing a default
    /// one if none exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_dir()?.join(FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed {}: {err}", path.display());
                Self::default()
            }))
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            Ok(cfg)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        Ok(())
    }

    /// Where the local store keeps its database file.
    pub fn local_db_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.store {
            StoreConfig::Local { path: Some(path) } => Ok(path.clone()),
            _ => Ok(state_dir()?.join("users.db")),
        }
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert_eq!(cfg, CoreConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_rest_backend_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        let cfg = CoreConfig {
            store: StoreConfig::Rest(RestConfig {
                url: "https://example.supabase.co".into(),
                api_key: Some("key".into()),
                table: default_table(),
                timeout_secs: None,
            }),
            ..Default::default()
        };

        cfg.save_to(&path).unwrap();

        assert_eq!(CoreConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_rest_table_defaults_to_users() {
        let cfg: CoreConfig = toml::from_str(
            r#"
            [store]
            backend = "rest"
            url = "https://example.supabase.co"
            "#,
        )
        .unwrap();

        match cfg.store {
            StoreConfig::Rest(rest) => assert_eq!(rest.table, "users"),
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "store = 3").unwrap();

        assert_eq!(CoreConfig::load_from(&path).unwrap(), CoreConfig::default());
    }
}
