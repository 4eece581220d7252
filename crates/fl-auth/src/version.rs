use chrono::Utc;
use fl_install::{GameInstall, Repository};
use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};

use crate::client::{LauncherClient, ensure_success, patch_time};
use crate::config::{PATCHER_USER_AGENT, headers};
use crate::errors::{LauncherError, PreconditionError, Result};
use crate::models::{LoginState, OauthLoginResult};
use crate::patch_list::PatchListEntry;

/// Result of registering a session with the game-version service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameVersionOutcome {
    /// The service refused to check game files until boot is patched (HTTP 409)
    NeedsPatchBoot,
    /// Session registered; `pending_patches` is empty when the game is current
    Registered {
        unique_id: String,
        pending_patches: Vec<PatchListEntry>,
    },
}

impl GameVersionOutcome {
    pub fn state(&self) -> LoginState {
        match self {
            Self::NeedsPatchBoot => LoginState::NeedsPatchBoot,
            Self::Registered {
                pending_patches, ..
            } if pending_patches.is_empty() => LoginState::Ok,
            Self::Registered { .. } => LoginState::NeedsPatchGame,
        }
    }
}

impl LauncherClient {
    fn host_of(url: &str) -> Option<String> {
        let url = url::Url::parse(url).ok()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }

    /// Ask the boot-version service for pending boot patches
    #[instrument(skip(self, install))]
    pub async fn check_boot_version(
        &self,
        install: &GameInstall,
        force_base_version: bool,
    ) -> Result<Vec<PatchListEntry>> {
        let version = install
            .reported_version(Repository::Boot, force_base_version)
            .await?;
        let url = format!(
            "{}/{}/?time={}",
            self.config.endpoints.boot_version,
            version,
            patch_time(Utc::now())
        );

        debug!(%version, "Checking boot version");
        let mut request = self.http.get(&url).header("User-Agent", PATCHER_USER_AGENT);
        if let Some(host) = Self::host_of(&url) {
            request = request.header("Host", host);
        }

        let response = ensure_success(request.send().await?).await?;
        let text = response.text().await?;

        if text.is_empty() {
            debug!("Boot is up to date");
            return Ok(Vec::new());
        }

        let patches = self.patch_list_parser.parse(&text)?;
        info!(count = patches.len(), "Boot patches pending");
        Ok(patches)
    }

    /// Register the OAuth session with the game-version service.
    ///
    /// Fails with a precondition error when no OAuth result is supplied or the
    /// local version files the account is entitled to are malformed.
    #[instrument(skip(self, oauth_login, install))]
    pub async fn check_game_version(
        &self,
        oauth_login: Option<&OauthLoginResult>,
        install: &GameInstall,
        force_base_version: bool,
    ) -> Result<GameVersionOutcome> {
        let oauth_login = oauth_login.ok_or(PreconditionError::MissingOauthLogin)?;

        install.ensure_version_sanity(oauth_login.max_expansion).await?;

        let version = install
            .reported_version(Repository::Game, force_base_version)
            .await?;
        let report = install
            .version_report(oauth_login.max_expansion, force_base_version)
            .await?;
        let url = format!(
            "{}/{}/{}",
            self.config.endpoints.game_version, version, oauth_login.session_id
        );

        debug!(%version, "Registering session with game-version service");
        let response = self
            .http
            .post(&url)
            .header("Connection", "Keep-Alive")
            .header(headers::HASH_CHECK, "enabled")
            .header("User-Agent", PATCHER_USER_AGENT)
            .body(report)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            warn!("Game-version service requires a boot patch first");
            return Ok(GameVersionOutcome::NeedsPatchBoot);
        }

        let unique_id = response
            .headers()
            .get(headers::PATCH_UNIQUE_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;

        let unique_id = unique_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| LauncherError::protocol("Could not get X-Patch-Unique-Id", &text))?;

        if text.is_empty() {
            debug!("Game is up to date");
            return Ok(GameVersionOutcome::Registered {
                unique_id,
                pending_patches: Vec::new(),
            });
        }

        let pending_patches = self.patch_list_parser.parse(&text)?;
        info!(count = pending_patches.len(), "Game patches pending");
        Ok(GameVersionOutcome::Registered {
            unique_id,
            pending_patches,
        })
    }

    /// Exchange a patch URL for a download token bound to the session's unique id
    #[instrument(skip(self, unique_id))]
    pub async fn gen_patch_token(&self, patch_url: &str, unique_id: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.config.endpoints.patch_token)
            .header("Connection", "Keep-Alive")
            .header(headers::PATCH_UNIQUE_ID, unique_id)
            .header("User-Agent", PATCHER_USER_AGENT)
            .body(patch_url.to_string())
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(response.text().await?)
    }
}
