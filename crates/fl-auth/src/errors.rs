use std::path::PathBuf;

use fl_install::InstallError;
use thiserror::Error;

/// Launcher login and version negotiation error types
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body_snippet}")]
    Http {
        status: reqwest::StatusCode,
        body_snippet: String,
    },

    #[error("Platform session could not be initialized")]
    PlatformInitFailed,

    #[error("Platform session is not logged in")]
    PlatformNotLoggedIn,

    #[error("Platform session did not hand out an auth ticket")]
    PlatformTicketUnavailable,

    #[error("Account must be linked to the platform account before logging in")]
    PlatformLinkRequired,

    #[error("Platform account is linked to '{linked}', not '{requested}'")]
    PlatformAccountMismatch { requested: String, linked: String },

    #[error("Unexpected response shape: {message}")]
    ProtocolViolation { message: String, body: String },

    #[error("Login rejected - credentials invalid or reply not understood")]
    CredentialsRejected { body: String },

    #[error("Version check precondition failed: {0}")]
    VersionCheckPrecondition(#[from] PreconditionError),

    #[error("Game executable not present at '{0}'")]
    ExecutableMissing(PathBuf),

    #[error("Local installation error: {0}")]
    Install(#[source] InstallError),

    #[error("Unique id cache error: {0}")]
    Cache(String),

    #[error("Game runner failed: {0}")]
    Runner(#[source] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Reasons a version negotiation refused to start
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("no OAuth login result available")]
    MissingOauthLogin,

    #[error("version file for {repository} is malformed: '{version}'")]
    InvalidVersionFiles { repository: String, version: String },
}

impl LauncherError {
    pub(crate) fn protocol(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
            body: body.into(),
        }
    }
}

impl From<InstallError> for LauncherError {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::InvalidVersionFile {
                repository,
                version,
            } => PreconditionError::InvalidVersionFiles {
                repository: repository.to_string(),
                version,
            }
            .into(),
            InstallError::ExecutableMissing { path } => Self::ExecutableMissing(path),
            other => Self::Install(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
