use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use derive_more::Deref;
use parking_lot::RwLock;
use roster_lib::{fs::config_dir, repository::config::ConfigError};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use theme::Theme;

mod theme;

const CURRENT_CONFIG_VERSION: u16 = 1;
const FILE_NAME: &str = "gui.toml";

/// Shared handle to the GUI configuration
#[derive(Debug, Clone, Deref)]
pub struct Cfg(Arc<RwLock<GuiConfig>>);

impl Cfg {
    pub fn new(cfg: GuiConfig) -> Self {
        Self(Arc::new(RwLock::new(cfg)))
    }
}

/// Settings of the desktop front end, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiConfig {
    #[serde(default = "current_version")]
    pub version: u16,
    #[serde(default)]
    pub theme: Theme,
}

fn current_version() -> u16 {
    CURRENT_CONFIG_VERSION
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            theme: Theme::default(),
        }
    }
}

impl GuiConfig {
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join(FILE_NAME))
    }

    /// Load the configuration, writing a default one if none exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
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

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        Ok(())
    }

    pub fn theme(&self) -> iced::Theme {
        (&self.theme).into()
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_theme_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);

        let mut cfg = GuiConfig::load_from(&path).unwrap();
        assert_eq!(cfg.theme, Theme::default());

        cfg.theme = cfg.theme.toggled();
        cfg.save_to(&path).unwrap();

        assert_eq!(GuiConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_unknown_theme_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "theme = \"Solarized\"").unwrap();

        assert_eq!(GuiConfig::load_from(&path).unwrap(), GuiConfig::default());
    }
}
