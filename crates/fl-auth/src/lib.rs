//! Login and version negotiation for the FINAL FANTASY XIV launcher services
//!
//! This crate talks to the Square Enix login pages and the patch servers the
//! way the official launcher does, and reports whether the local install may
//! be launched.
//!
//! # Login Flow
//!
//! 1. Optional platform ticket (raw blob or live platform session)
//! 2. Unique-id cache shortcut
//! 3. OAuth top page scrape and credential submission
//! 4. Game-version registration, yielding the session unique id and any
//!    pending patches
//!
//! # Example
//!
//! ```no_run
//! use fl_auth::{Credentials, Launcher, LauncherClient, LauncherConfig, LoginRequest, LoginState};
//! use fl_install::{ClientLanguage, GameInstall};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = LauncherClient::new(LauncherConfig::new(ClientLanguage::English))?;
//!     let launcher = Launcher::new(client);
//!
//!     let install = GameInstall::new("/games/ffxiv");
//!     let request = LoginRequest::new(Credentials::new("player", "password", ""), 3);
//!
//!     let result = launcher.login(&request, &install).await?;
//!     match result.state {
//!         LoginState::Ok => println!("Ready to launch"),
//!         LoginState::NeedsPatchGame => println!("{} patches pending", result.pending_patches.len()),
//!         other => println!("Cannot launch: {:?}", other),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Unique-Id Cache
//!
//! Repeat logins can skip the network entirely through a `UniqueIdCache`:
//!
//! ```
//! use fl_auth::{MemoryUniqueIdCache, UniqueIdCache, UniqueIdCacheEntry};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cache = MemoryUniqueIdCache::new();
//! cache.put(UniqueIdCacheEntry::new("player", "unique-id", 3, 5)).await?;
//!
//! if let Some(entry) = cache.get("player").await {
//!     println!("Cached region {} for {}", entry.region, entry.user_name);
//! }
//! # Ok(())
//! # }
//! # tokio_test::block_on(example()).unwrap();
//! ```
//!
//! `FileUniqueIdCache` keeps the same entries in a JSON file under the user
//! cache directory. Entries expire a day after they are written.

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod file_cache;
pub mod identity;
pub mod launch;
pub mod login;
pub mod models;
pub mod oauth;
pub mod patch_list;
pub mod status;
pub mod ticket;
pub mod version;

// Re-export main types
pub use cache::{MemoryUniqueIdCache, UniqueIdCache, UniqueIdCacheEntry};
pub use client::LauncherClient;
pub use config::{Endpoints, HttpTimeouts, LauncherConfig, TransportConfig};
pub use errors::{LauncherError, PreconditionError, Result};
pub use file_cache::FileUniqueIdCache;
pub use identity::MachineIdentity;
pub use launch::{GameRunner, LaunchArguments, LaunchOptions, build_launch_arguments};
pub use login::{Launcher, LoginRequest, LoginStep};
pub use models::{GateStatus, LoginResult, LoginState, OauthLoginResult};
pub use oauth::{Credentials, OauthParams};
pub use patch_list::{MultipartPatchListParser, PatchListEntry, PatchListParser};
pub use ticket::{PlatformLogin, PlatformTicket, TicketProvider};
pub use version::GameVersionOutcome;
