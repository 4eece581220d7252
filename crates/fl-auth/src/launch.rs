use std::path::Path;

use fl_install::{ClientLanguage, GameInstall, Repository};
use tracing::{info, instrument, warn};

use crate::errors::{LauncherError, Result};
use crate::models::{LoginResult, LoginState};

/// Ordered `key=value` arguments handed to the game process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArguments {
    entries: Vec<(String, String)>,
}

impl LaunchArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

/// Options the caller controls when building game arguments
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub language: ClientLanguage,
    pub platform_login: bool,
    /// Extra `key=value` pairs; malformed items are skipped
    pub additional_arguments: Vec<String>,
}

/// Starts the game process; argument encryption is the runner's business
#[async_trait::async_trait]
pub trait GameRunner: Send + Sync {
    /// Start `executable` and return its process id
    async fn start(&self, executable: &Path, arguments: &LaunchArguments) -> anyhow::Result<u32>;
}

/// Build the flat argument set for a logged-in session
pub async fn build_launch_arguments(
    login: &LoginResult,
    install: &GameInstall,
    options: &LaunchOptions,
) -> Result<LaunchArguments> {
    let oauth = login.oauth_login.as_ref().ok_or_else(|| {
        LauncherError::InvalidRequest("Cannot build launch arguments without a login".to_string())
    })?;
    let unique_id = login.unique_id.as_deref().ok_or_else(|| {
        LauncherError::InvalidRequest("Cannot build launch arguments without a unique id".to_string())
    })?;

    let game_version = install.version(Repository::Game).await?;

    let mut arguments = LaunchArguments::new();
    arguments
        .append("DEV.DataPathType", "1")
        .append("DEV.MaxEntitledExpansionID", oauth.max_expansion.to_string())
        .append("DEV.TestSID", unique_id)
        .append("DEV.UseSqPack", "1")
        .append("SYS.Region", oauth.region.to_string())
        .append("language", options.language.game_id().to_string())
        .append("ver", game_version);

    if options.platform_login {
        arguments.append("IsSteam", "1");
    }

    for extra in &options.additional_arguments {
        match extra.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                arguments.append(key.trim(), value.trim());
            }
            _ => warn!("Ignoring malformed launch argument {:?}", extra),
        }
    }

    Ok(arguments)
}

/// Start the game for a successful login through `runner`
#[instrument(skip(login, install, options, runner))]
pub async fn launch_game(
    login: &LoginResult,
    install: &GameInstall,
    options: &LaunchOptions,
    runner: &dyn GameRunner,
) -> Result<u32> {
    if login.state != LoginState::Ok {
        return Err(LauncherError::InvalidRequest(format!(
            "Cannot launch while login state is {:?}",
            login.state
        )));
    }

    let executable = install.game_executable().await?;
    let arguments = build_launch_arguments(login, install, options).await?;

    let pid = runner
        .start(&executable, &arguments)
        .await
        .map_err(LauncherError::Runner)?;

    info!(pid, "Game process started");
    Ok(pid)
}
