use std::path::PathBuf;

use thiserror::Error;

use crate::repository::Repository;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(
        "Project directories are unavailable - this usually indicates an unsupported OS or missing home directory"
    )]
    ProjectDirectoriesUnavailable,

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read version file '{path}': {source}")]
    VersionFileReadFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to hash boot binary '{path}': {source}")]
    BinaryHashFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Version file for {repository} is malformed: '{version}'")]
    InvalidVersionFile {
        repository: Repository,
        version: String,
    },

    #[error("Game executable not present at '{path}'")]
    ExecutableMissing { path: PathBuf },

    #[error("Settings file not found: '{path}'")]
    SettingsFileNotFound { path: PathBuf },

    #[error("Failed to read settings file '{path}': {source}")]
    SettingsFileReadFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write settings file '{path}': {source}")]
    SettingsFileWriteFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    SettingsParsingFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to serialize settings: {source}")]
    SettingsSerializationFailed {
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, InstallError>;
