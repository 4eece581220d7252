use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::errors::{InstallError, Result};
use crate::install::GameInstall;
use crate::language::ClientLanguage;

/// Persisted launcher settings (`settings.toml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherSettings {
    pub game_path: PathBuf,
    #[serde(default)]
    pub language: ClientLanguage,
    #[serde(default = "default_region")]
    pub region: u32,
    #[serde(default)]
    pub free_trial: bool,
    #[serde(default = "default_true")]
    pub use_unique_id_cache: bool,
    #[serde(default)]
    pub force_base_version: bool,
    #[serde(default)]
    pub legacy_tls: bool,
    /// Extra `key=value` pairs appended to the game arguments
    #[serde(default)]
    pub additional_arguments: Vec<String>,
}

fn default_region() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

impl LauncherSettings {
    pub fn new(game_path: impl Into<PathBuf>) -> Self {
        Self {
            game_path: game_path.into(),
            language: ClientLanguage::default(),
            region: default_region(),
            free_trial: false,
            use_unique_id_cache: true,
            force_base_version: false,
            legacy_tls: false,
            additional_arguments: Vec::new(),
        }
    }

    pub fn install(&self) -> GameInstall {
        GameInstall::new(&self.game_path)
    }

    /// Default location of the settings file for the current platform
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "frontier", "frontier-launcher")
            .ok_or_else(|| {
                error!("Failed to determine project directories - this usually indicates an unsupported OS or missing home directory");
                InstallError::ProjectDirectoriesUnavailable
            })?;

        Ok(proj_dirs.config_dir().join("settings.toml"))
    }

    #[instrument(level = "debug")]
    pub async fn load(path: &Path) -> Result<Self> {
        if tokio::fs::metadata(path).await.is_err() {
            return Err(InstallError::SettingsFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .context("Failed to read settings.toml file")
            .map_err(|e| {
                error!("Failed to read settings file {}: {}", path.display(), e);
                InstallError::SettingsFileReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;

        debug!("Read {} bytes from {}", content.len(), path.display());

        toml::from_str(&content)
            .context("Failed to parse settings.toml file")
            .map_err(|e| InstallError::SettingsParsingFailed {
                path: path.to_path_buf(),
                source: e,
            })
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create settings directory")
                .map_err(|e| InstallError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let toml = toml::to_string_pretty(self)
            .context("Failed to serialize settings to TOML")
            .map_err(|e| InstallError::SettingsSerializationFailed { source: e })?;

        tokio::fs::write(path, toml)
            .await
            .context("Failed to write settings.toml file")
            .map_err(|e| {
                error!("Failed to write settings file {}: {}", path.display(), e);
                InstallError::SettingsFileWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;

        info!("Saved launcher settings at {}", path.display());
        Ok(())
    }
}
