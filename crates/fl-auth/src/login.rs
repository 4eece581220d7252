//! Login orchestration.
//!
//! [`Launcher::login`] walks an explicit [`LoginStep`] machine:
//! platform ticket, then the unique-id cache shortcut, then OAuth and the
//! game-version registration. Every intermediate value is carried in the step
//! itself and returned in the [`LoginResult`], nothing is remembered on the
//! launcher between calls.

use std::sync::Arc;

use chrono::Utc;
use fl_install::GameInstall;
use tracing::{debug, info, instrument, warn};

use crate::cache::{UniqueIdCache, UniqueIdCacheEntry};
use crate::client::LauncherClient;
use crate::errors::{LauncherError, Result};
use crate::launch::{GameRunner, LaunchOptions, launch_game};
use crate::models::{LoginResult, LoginState, OauthLoginResult};
use crate::oauth::{Credentials, OauthParams};
use crate::ticket::{PlatformLogin, PlatformTicket, TicketProvider};
use crate::version::GameVersionOutcome;

/// Everything one login attempt needs from the caller
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub credentials: Credentials,
    pub region: u32,
    pub free_trial: bool,
    /// Platform-mode login and where its ticket comes from
    pub platform: Option<PlatformLogin>,
    /// Allow the unique-id cache to short-circuit the network login
    pub use_cache: bool,
    /// Report the baseline version instead of the installed one
    pub force_base_version: bool,
    /// Poll the login status before OAuth and stop with `NoLogin` when closed
    pub check_login_status: bool,
}

impl LoginRequest {
    pub fn new(credentials: Credentials, region: u32) -> Self {
        Self {
            credentials,
            region,
            free_trial: false,
            platform: None,
            use_cache: false,
            force_base_version: false,
            check_login_status: false,
        }
    }
}

/// Position of a login attempt
#[derive(Debug)]
pub enum LoginStep {
    AwaitingTicket,
    CacheHit(UniqueIdCacheEntry),
    AwaitingOauth { ticket: Option<PlatformTicket> },
    AwaitingVersionCheck { oauth: OauthLoginResult },
    Done(LoginResult),
}

/// Login front door: the HTTP client plus the optional collaborators
#[derive(Clone)]
pub struct Launcher {
    client: LauncherClient,
    cache: Option<Arc<dyn UniqueIdCache>>,
    tickets: Option<Arc<dyn TicketProvider>>,
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("client", &self.client)
            .field("cache", &self.cache.is_some())
            .field("tickets", &self.tickets.is_some())
            .finish()
    }
}

impl Launcher {
    pub fn new(client: LauncherClient) -> Self {
        Self {
            client,
            cache: None,
            tickets: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn UniqueIdCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_ticket_provider(mut self, tickets: Arc<dyn TicketProvider>) -> Self {
        self.tickets = Some(tickets);
        self
    }

    pub fn client(&self) -> &LauncherClient {
        &self.client
    }

    /// Run a complete login attempt.
    ///
    /// Logical outcomes (no subscription, unaccepted terms, pending patches,
    /// boot patch required, closed login servers) come back as the
    /// [`LoginResult`] state. Everything else is an error.
    #[instrument(skip(self, request, install), fields(user = %request.credentials.user_name, platform = request.platform.is_some()))]
    pub async fn login(&self, request: &LoginRequest, install: &GameInstall) -> Result<LoginResult> {
        let mut step = LoginStep::AwaitingTicket;

        loop {
            step = match self.advance(step, request, install).await? {
                LoginStep::Done(result) => {
                    info!(state = ?result.state, patches = result.pending_patches.len(), "Login finished");
                    return Ok(result);
                }
                next => next,
            };
        }
    }

    /// Perform the work of one step and return the next
    pub async fn advance(
        &self,
        step: LoginStep,
        request: &LoginRequest,
        install: &GameInstall,
    ) -> Result<LoginStep> {
        match step {
            LoginStep::AwaitingTicket => {
                let ticket = match &request.platform {
                    Some(platform) => Some(self.platform_ticket(platform).await?),
                    None => None,
                };

                match self.cached_entry(request).await {
                    Some(entry) => Ok(LoginStep::CacheHit(entry)),
                    None => Ok(LoginStep::AwaitingOauth { ticket }),
                }
            }

            LoginStep::CacheHit(entry) => {
                debug!("Using cached unique id");
                Ok(LoginStep::Done(LoginResult {
                    state: LoginState::Ok,
                    pending_patches: Vec::new(),
                    oauth_login: Some(OauthLoginResult {
                        session_id: String::new(),
                        region: entry.region,
                        terms_accepted: true,
                        playable: true,
                        max_expansion: entry.max_expansion,
                    }),
                    unique_id: Some(entry.unique_id),
                }))
            }

            LoginStep::AwaitingOauth { ticket } => {
                if request.check_login_status && !self.client.login_status().await? {
                    warn!("Login servers are closed");
                    return Ok(LoginStep::Done(LoginResult::stopped(LoginState::NoLogin, None)));
                }

                let params = OauthParams {
                    region: request.region,
                    free_trial: request.free_trial,
                    ticket,
                };
                let oauth = self.client.oauth_login(&request.credentials, &params).await?;

                if !oauth.playable {
                    return Ok(LoginStep::Done(LoginResult::stopped(LoginState::NoService, Some(oauth))));
                }
                if !oauth.terms_accepted {
                    return Ok(LoginStep::Done(LoginResult::stopped(LoginState::NoTerms, Some(oauth))));
                }

                Ok(LoginStep::AwaitingVersionCheck { oauth })
            }

            LoginStep::AwaitingVersionCheck { oauth } => {
                let outcome = self
                    .client
                    .check_game_version(Some(&oauth), install, request.force_base_version)
                    .await?;
                let state = outcome.state();

                let result = match outcome {
                    GameVersionOutcome::NeedsPatchBoot => {
                        LoginResult::stopped(LoginState::NeedsPatchBoot, Some(oauth))
                    }
                    GameVersionOutcome::Registered {
                        unique_id,
                        pending_patches,
                    } => LoginResult {
                        state,
                        pending_patches,
                        oauth_login: Some(oauth),
                        unique_id: Some(unique_id),
                    },
                };

                if state == LoginState::Ok {
                    self.remember(request, &result).await;
                }

                Ok(LoginStep::Done(result))
            }

            done @ LoginStep::Done(_) => Ok(done),
        }
    }

    /// Start the game for a successful login
    pub async fn launch(
        &self,
        login: &LoginResult,
        install: &GameInstall,
        options: &LaunchOptions,
        runner: &dyn GameRunner,
    ) -> Result<u32> {
        launch_game(login, install, options, runner).await
    }

    async fn platform_ticket(&self, platform: &PlatformLogin) -> Result<PlatformTicket> {
        let provider = self.tickets.as_ref().ok_or(LauncherError::PlatformInitFailed)?;

        match platform {
            PlatformLogin::RawTicket(raw) => Ok(provider.encrypt_raw(raw, Utc::now().timestamp())),
            PlatformLogin::LiveSession => {
                if !provider.is_initialized() {
                    return Err(LauncherError::PlatformInitFailed);
                }
                if !provider.is_logged_in() {
                    return Err(LauncherError::PlatformNotLoggedIn);
                }
                provider
                    .session_ticket()
                    .await
                    .ok_or(LauncherError::PlatformTicketUnavailable)
            }
        }
    }

    async fn cached_entry(&self, request: &LoginRequest) -> Option<UniqueIdCacheEntry> {
        if !request.use_cache {
            return None;
        }
        self.cache.as_ref()?.get(&request.credentials.user_name).await
    }

    async fn remember(&self, request: &LoginRequest, result: &LoginResult) {
        if !request.use_cache {
            return;
        }
        let (Some(cache), Some(oauth), Some(unique_id)) =
            (&self.cache, &result.oauth_login, &result.unique_id)
        else {
            return;
        };

        let entry = UniqueIdCacheEntry::new(
            &request.credentials.user_name,
            unique_id,
            oauth.region,
            oauth.max_expansion,
        );
        if let Err(e) = cache.put(entry).await {
            warn!("Failed to cache unique id: {}", e);
        }
    }
}
