use std::time::Duration;

use fl_install::ClientLanguage;

/// Square Enix launcher endpoints
pub mod endpoints {
    pub const OAUTH_TOP: &str = "https://ffxiv-login.square-enix.com/oauth/ffxivarr/login/top";
    pub const OAUTH_SEND: &str = "https://ffxiv-login.square-enix.com/oauth/ffxivarr/login/login.send";
    pub const BOOT_VERSION: &str = "http://patch-bootver.ffxiv.com/http/win32/ffxivneo_release_boot";
    pub const GAME_VERSION: &str = "https://patch-gamever.ffxiv.com/http/win32/ffxivneo_release_game";
    pub const PATCH_TOKEN: &str = "http://patch-gamever.ffxiv.com/gen_token";
    pub const GATE_STATUS: &str = "https://frontier.ffxiv.com/worldStatus/gate_status.json";
    pub const LOGIN_STATUS: &str = "https://frontier.ffxiv.com/worldStatus/login_status.json";
    pub const FRONTIER_ORIGIN: &str = "https://launcher.finalfantasyxiv.com";
    pub const FRONTIER_INDEX: &str = "https://launcher.finalfantasyxiv.com/v700/index.html";
}

/// Fixed header values the remote services expect
pub mod headers {
    pub const ACCEPT_OAUTH: &str = "image/gif, image/jpeg, image/pjpeg, application/x-ms-application, application/xaml+xml, application/x-ms-xbap, */*";
    pub const ACCEPT_ENCODING: &str = "gzip, deflate";
    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.8,ja;q=0.6,de-DE;q=0.4,de;q=0.2";
    pub const EMPTY_SESSION_COOKIE: &str = "_rsid=\"\"";
    pub const PATCH_UNIQUE_ID: &str = "X-Patch-Unique-Id";
    pub const HASH_CHECK: &str = "X-Hash-Check";
}

/// User-Agent template for frontier-domain requests, `{}` is the computer id
pub const USER_AGENT_TEMPLATE: &str = "SQEXAuthor/2.0.0(Windows 6.2; ja-jp; {})";

/// User-Agent the official patcher sends to the version services
pub const PATCHER_USER_AGENT: &str = "FFXIV PATCH CLIENT";

/// Endpoint set, overridable for mirrors and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub oauth_top: String,
    pub oauth_send: String,
    pub boot_version: String,
    pub game_version: String,
    pub patch_token: String,
    pub gate_status: String,
    pub login_status: String,
    pub frontier_origin: String,
    pub frontier_index: String,
}

impl Endpoints {
    /// Route every endpoint to one host, keeping the official paths
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            oauth_top: format!("{base}/oauth/ffxivarr/login/top"),
            oauth_send: format!("{base}/oauth/ffxivarr/login/login.send"),
            boot_version: format!("{base}/http/win32/ffxivneo_release_boot"),
            game_version: format!("{base}/http/win32/ffxivneo_release_game"),
            patch_token: format!("{base}/gen_token"),
            gate_status: format!("{base}/worldStatus/gate_status.json"),
            login_status: format!("{base}/worldStatus/login_status.json"),
            frontier_origin: base.to_string(),
            frontier_index: format!("{base}/v700/index.html"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            oauth_top: endpoints::OAUTH_TOP.to_string(),
            oauth_send: endpoints::OAUTH_SEND.to_string(),
            boot_version: endpoints::BOOT_VERSION.to_string(),
            game_version: endpoints::GAME_VERSION.to_string(),
            patch_token: endpoints::PATCH_TOKEN.to_string(),
            gate_status: endpoints::GATE_STATUS.to_string(),
            login_status: endpoints::LOGIN_STATUS.to_string(),
            frontier_origin: endpoints::FRONTIER_ORIGIN.to_string(),
            frontier_index: endpoints::FRONTIER_INDEX.to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            request: Duration::from_secs(30),
        }
    }
}

/// TLS transport options
///
/// `legacy_cipher_suite` restricts the handshake to TLS 1.2
/// ECDHE-RSA-AES256-GCM-SHA384, which the login servers negotiated on
/// some historical setups. It is only honoured when the crate is built with
/// the `legacy-tls` feature; otherwise the platform TLS defaults are used and
/// the flag is logged and ignored.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub legacy_cipher_suite: bool,
}

/// Configuration for LauncherClient
#[derive(Debug, Clone, Default)]
pub struct LauncherConfig {
    pub endpoints: Endpoints,

    /// Language used for frontier referers and gate status
    pub language: ClientLanguage,

    pub http_timeouts: HttpTimeouts,

    pub transport: TransportConfig,

    /// Replaces the generated SQEXAuthor User-Agent (optional)
    pub user_agent: Option<String>,
}

impl LauncherConfig {
    pub fn new(language: ClientLanguage) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}
