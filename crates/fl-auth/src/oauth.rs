//! OAuth login against the Square Enix login pages.
//!
//! The login is a two step page exchange: the top page hands out a hidden
//! `_STORED_` token (and, for platform logins, the linked account id), and
//! `login.send` answers with a JavaScript callback line carrying the session
//! parameters. Text extraction lives in [`parse_top_page`] and
//! [`parse_login_reply`] so the matching strategy can change without touching
//! the request code.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};
use zeroize::Zeroizing;

use crate::client::LauncherClient;
use crate::config::headers;
use crate::errors::{LauncherError, Result};
use crate::models::OauthLoginResult;
use crate::ticket::PlatformTicket;

const RESTART_MARKER: &str = "window.external.user(\"restartup\");";

static STORED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\t<\s*input .* name="_STORED_" value="(?P<stored>.*)">"#).expect("valid regex")
});
static LINKED_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<input name="sqexid" type="hidden" value="(?P<sqexid>.*)"/>"#).expect("valid regex")
});
static LAUNCH_PARAMS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"window.external.user\("login=auth,ok,(?P<params>.*)\);"#).expect("valid regex")
});

/// Positions of the session fields in the comma-separated launch parameters.
///
/// The list alternates keys and values (`sid,<id>,terms,<n>,region,<n>,...`),
/// these are the value slots.
pub mod launch_params {
    pub const SESSION_ID: usize = 1;
    pub const TERMS_ACCEPTED: usize = 3;
    pub const REGION: usize = 5;
    pub const PLAYABLE: usize = 9;
    pub const MAX_EXPANSION: usize = 13;
}

/// Login attempt parameters shared by the top page and the submit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OauthParams {
    pub region: u32,
    pub free_trial: bool,
    pub ticket: Option<PlatformTicket>,
}

impl OauthParams {
    pub fn is_platform_login(&self) -> bool {
        self.ticket.is_some()
    }
}

/// Account credentials; secrets are zeroized on drop
#[derive(Clone)]
pub struct Credentials {
    pub user_name: String,
    pub password: Zeroizing<String>,
    pub one_time_password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>, otp: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: Zeroizing::new(password.into()),
            one_time_password: Zeroizing::new(otp.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .field("one_time_password", &"[REDACTED]")
            .finish()
    }
}

/// Tokens scraped from the OAuth top page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopPage {
    pub stored: String,
    pub linked_id: Option<String>,
}

/// Extract the `_STORED_` token and, in platform mode, the linked account id
pub fn parse_top_page(text: &str, platform_login: bool) -> Result<TopPage> {
    if text.contains(RESTART_MARKER) {
        if platform_login {
            return Err(LauncherError::PlatformLinkRequired);
        }
        return Err(LauncherError::protocol("Restart requested outside platform login", text));
    }

    let stored = STORED_REGEX
        .captures(text)
        .and_then(|caps| caps.name("stored"))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| LauncherError::protocol("Could not get STORED", text))?;

    let linked_id = if platform_login {
        let id = LINKED_ID_REGEX
            .captures(text)
            .and_then(|caps| caps.name("sqexid"))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| LauncherError::protocol("Could not get linked account id", text))?;
        Some(id)
    } else {
        None
    };

    Ok(TopPage { stored, linked_id })
}

/// Parse the session parameters out of a `login.send` reply
pub fn parse_login_reply(text: &str) -> Result<OauthLoginResult> {
    let params = LAUNCH_PARAMS_REGEX
        .captures(text)
        .and_then(|caps| caps.name("params"))
        .map(|m| m.as_str())
        .ok_or_else(|| LauncherError::CredentialsRejected {
            body: text.to_string(),
        })?;

    let fields: Vec<&str> = params.split(',').collect();
    let field = |index: usize| {
        fields.get(index).copied().ok_or_else(|| {
            LauncherError::protocol(format!("Launch parameter {index} missing"), text)
        })
    };
    let number = |index: usize| -> Result<u32> {
        field(index)?.parse::<u32>().map_err(|_| {
            LauncherError::protocol(format!("Launch parameter {index} is not a number"), text)
        })
    };

    Ok(OauthLoginResult {
        session_id: field(launch_params::SESSION_ID)?.to_string(),
        region: number(launch_params::REGION)?,
        terms_accepted: field(launch_params::TERMS_ACCEPTED)? != "0",
        playable: field(launch_params::PLAYABLE)? != "0",
        max_expansion: number(launch_params::MAX_EXPANSION)?,
    })
}

impl LauncherClient {
    /// URL of the OAuth top page for these parameters
    pub fn oauth_top_url(&self, params: &OauthParams) -> String {
        let mut url = format!(
            "{}?lng=en&rgn={}&isft={}&cssmode=1&isnew=1&launchver=3",
            self.config.endpoints.oauth_top,
            params.region,
            if params.free_trial { "1" } else { "0" }
        );

        if let Some(ticket) = &params.ticket {
            url.push_str(&format!(
                "&issteam=1&session_ticket={}&ticket_size={}",
                ticket.text, ticket.length
            ));
        }

        url
    }

    /// Fetch the OAuth top page and scrape its tokens
    #[instrument(skip(self, params), fields(region = params.region, platform = params.is_platform_login()))]
    pub async fn oauth_top(&self, params: &OauthParams) -> Result<TopPage> {
        debug!("Fetching OAuth top page");
        let response = self
            .http
            .get(self.oauth_top_url(params))
            .header("Accept", headers::ACCEPT_OAUTH)
            .header("Referer", self.frontier_referer())
            .header("Accept-Encoding", headers::ACCEPT_ENCODING)
            .header("Accept-Language", headers::ACCEPT_LANGUAGE)
            .header("User-Agent", &self.user_agent)
            .header("Connection", "Keep-Alive")
            .header("Cookie", headers::EMPTY_SESSION_COOKIE)
            .send()
            .await?;

        let text = response.text().await?;
        parse_top_page(&text, params.is_platform_login())
    }

    /// Submit credentials with the scraped token
    #[instrument(skip(self, credentials, params, top), fields(user = %credentials.user_name))]
    pub async fn oauth_submit(
        &self,
        credentials: &Credentials,
        params: &OauthParams,
        top: &TopPage,
    ) -> Result<OauthLoginResult> {
        let user_name = match (&top.linked_id, params.is_platform_login()) {
            (Some(linked), true) => {
                if !linked.eq_ignore_ascii_case(&credentials.user_name) {
                    return Err(LauncherError::PlatformAccountMismatch {
                        requested: credentials.user_name.clone(),
                        linked: linked.clone(),
                    });
                }
                linked.clone()
            }
            (None, true) => {
                return Err(LauncherError::InvalidRequest(
                    "Platform login without a linked account id".to_string(),
                ));
            }
            _ => credentials.user_name.clone(),
        };

        let form = [
            ("_STORED_", top.stored.as_str()),
            ("sqexid", user_name.as_str()),
            ("password", credentials.password.as_str()),
            ("otppw", credentials.one_time_password.as_str()),
        ];

        debug!("Submitting OAuth credentials");
        let response = self
            .http
            .post(&self.config.endpoints.oauth_send)
            .header("Accept", headers::ACCEPT_OAUTH)
            .header("Referer", self.oauth_top_url(params))
            .header("Accept-Language", headers::ACCEPT_LANGUAGE)
            .header("User-Agent", &self.user_agent)
            .header("Accept-Encoding", headers::ACCEPT_ENCODING)
            .header("Connection", "Keep-Alive")
            .header("Cache-Control", "no-cache")
            .header("Cookie", headers::EMPTY_SESSION_COOKIE)
            .form(&form)
            .send()
            .await?;

        let text = response.text().await?;
        let result = parse_login_reply(&text)?;

        info!(
            playable = result.playable,
            terms = result.terms_accepted,
            region = result.region,
            max_expansion = result.max_expansion,
            "OAuth login successful"
        );
        Ok(result)
    }

    /// Top page followed by credential submission
    #[instrument(skip(self, credentials, params))]
    pub async fn oauth_login(&self, credentials: &Credentials, params: &OauthParams) -> Result<OauthLoginResult> {
        let top = self.oauth_top(params).await?;
        self.oauth_submit(credentials, params, &top).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Endpoints, LauncherConfig};
    use wiremock::matchers::{body_string_contains, header, header_regex, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const TOP_PAGE: &str = "<html><body><form>\n\
\t<input type=\"hidden\" name=\"_STORED_\" value=\"stored-token-123\">\n\
</form></body></html>";

    const PLATFORM_TOP_PAGE: &str = "<html><body><form>\n\
\t<input type=\"hidden\" name=\"_STORED_\" value=\"stored-token-123\">\n\
<input name=\"sqexid\" type=\"hidden\" value=\"LinkedPlayer\"/>\n\
</form></body></html>";

    const LOGIN_REPLY: &str = "<script>\n\
window.external.user(\"login=auth,ok,sid,session-abc,terms,1,region,3,etmadd,0,playable,1,ps3pkg,0,maxex,5,product,1\");\n\
</script>";

    /// Whole-value header comparison; the fixed values contain commas
    fn exact_header(name: &'static str, value: impl Into<String>) -> impl Fn(&Request) -> bool + Send + Sync {
        let value = value.into();
        move |request: &Request| {
            request
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == value)
        }
    }

    fn client_for(server: &MockServer) -> LauncherClient {
        let config = LauncherConfig {
            user_agent: Some("test-agent".to_string()),
            ..LauncherConfig::default()
        }
        .with_endpoints(Endpoints::with_base(&server.uri()));
        LauncherClient::new(config).unwrap()
    }

    fn params() -> OauthParams {
        OauthParams {
            region: 3,
            free_trial: false,
            ticket: None,
        }
    }

    fn platform_params() -> OauthParams {
        OauthParams {
            region: 3,
            free_trial: false,
            ticket: Some(PlatformTicket {
                text: "abc-def,ghi".to_string(),
                length: 10,
            }),
        }
    }

    #[test]
    fn test_parse_launch_params_positions() {
        let result = parse_login_reply(LOGIN_REPLY).unwrap();
        assert_eq!(
            result,
            OauthLoginResult {
                session_id: "session-abc".to_string(),
                region: 3,
                terms_accepted: true,
                playable: true,
                max_expansion: 5,
            }
        );
    }

    #[test]
    fn test_parse_launch_params_zero_flags() {
        let reply = "window.external.user(\"login=auth,ok,sid,s,terms,0,region,1,etmadd,0,playable,0,ps3pkg,0,maxex,0,product,1\");";
        let result = parse_login_reply(reply).unwrap();
        assert!(!result.terms_accepted);
        assert!(!result.playable);
        assert_eq!(result.region, 1);
        assert_eq!(result.max_expansion, 0);
    }

    #[test]
    fn test_reply_without_ok_marker_is_rejected() {
        let reply = "window.external.user(\"login=auth,ng,err,ID or password is incorrect\");";
        match parse_login_reply(reply) {
            Err(LauncherError::CredentialsRejected { body }) => assert_eq!(body, reply),
            other => panic!("Expected CredentialsRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_reply_with_short_params_is_protocol_violation() {
        let reply = "window.external.user(\"login=auth,ok,sid,abc,terms,1\");";
        let result = parse_login_reply(reply);
        assert!(matches!(result, Err(LauncherError::ProtocolViolation { .. })));
    }

    #[test]
    fn test_parse_top_page() {
        let top = parse_top_page(TOP_PAGE, false).unwrap();
        assert_eq!(top.stored, "stored-token-123");
        assert_eq!(top.linked_id, None);

        let top = parse_top_page(PLATFORM_TOP_PAGE, true).unwrap();
        assert_eq!(top.linked_id.as_deref(), Some("LinkedPlayer"));
    }

    #[test]
    fn test_top_page_without_stored() {
        let result = parse_top_page("<html>changed layout</html>", false);
        assert!(matches!(result, Err(LauncherError::ProtocolViolation { .. })));
    }

    #[test]
    fn test_top_page_platform_without_linked_id() {
        let result = parse_top_page(TOP_PAGE, true);
        assert!(matches!(result, Err(LauncherError::ProtocolViolation { .. })));
    }

    #[test]
    fn test_top_page_restart_marker() {
        let page = format!("{TOP_PAGE}<script>{RESTART_MARKER}</script>");
        assert!(matches!(
            parse_top_page(&page, true),
            Err(LauncherError::PlatformLinkRequired)
        ));
        assert!(matches!(
            parse_top_page(&page, false),
            Err(LauncherError::ProtocolViolation { .. })
        ));
    }

    #[test]
    fn test_top_url() {
        let client = LauncherClient::new(LauncherConfig::default()).unwrap();
        assert_eq!(
            client.oauth_top_url(&params()),
            "https://ffxiv-login.square-enix.com/oauth/ffxivarr/login/top?lng=en&rgn=3&isft=0&cssmode=1&isnew=1&launchver=3"
        );

        let mut trial = params();
        trial.free_trial = true;
        assert!(client.oauth_top_url(&trial).contains("&isft=1&"));

        assert!(client
            .oauth_top_url(&platform_params())
            .ends_with("&issteam=1&session_ticket=abc-def,ghi&ticket_size=10"));
    }

    #[tokio::test]
    async fn test_oauth_login_flow() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oauth/ffxivarr/login/top"))
            .and(query_param("rgn", "3"))
            .and(query_param("launchver", "3"))
            .and(header("Cookie", "_rsid=\"\""))
            .and(header("User-Agent", "test-agent"))
            .and(exact_header("Accept", headers::ACCEPT_OAUTH))
            .and(exact_header("Accept-Encoding", headers::ACCEPT_ENCODING))
            .and(exact_header("Accept-Language", headers::ACCEPT_LANGUAGE))
            .and(exact_header("Connection", "Keep-Alive"))
            .and(header_regex(
                "Referer",
                r"/v700/index\.html\?rc_lang=en-gb&time=\d{4}-\d{2}-\d{2}-\d{2}-\d{2}$",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(TOP_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/oauth/ffxivarr/login/login.send"))
            .and(body_string_contains("_STORED_=stored-token-123"))
            .and(body_string_contains("sqexid=player"))
            .and(body_string_contains("password=hunter2"))
            .and(body_string_contains("otppw=123456"))
            .and(exact_header(
                "Referer",
                format!(
                    "{}/oauth/ffxivarr/login/top?lng=en&rgn=3&isft=0&cssmode=1&isnew=1&launchver=3",
                    server.uri()
                ),
            ))
            .and(exact_header("Accept", headers::ACCEPT_OAUTH))
            .and(exact_header("Accept-Encoding", headers::ACCEPT_ENCODING))
            .and(exact_header("Accept-Language", headers::ACCEPT_LANGUAGE))
            .and(exact_header("Connection", "Keep-Alive"))
            .and(exact_header("Cache-Control", "no-cache"))
            .and(header("Cookie", "_rsid=\"\""))
            .and(header("User-Agent", "test-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_REPLY))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credentials = Credentials::new("player", "hunter2", "123456");
        let result = client.oauth_login(&credentials, &params()).await.unwrap();

        assert_eq!(result.session_id, "session-abc");
        assert_eq!(result.max_expansion, 5);
    }

    #[tokio::test]
    async fn test_platform_login_normalizes_user_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oauth/ffxivarr/login/top"))
            .and(query_param("issteam", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PLATFORM_TOP_PAGE))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/oauth/ffxivarr/login/login.send"))
            .and(body_string_contains("sqexid=LinkedPlayer"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_REPLY))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credentials = Credentials::new("linkedplayer", "pw", "");
        let result = client.oauth_login(&credentials, &platform_params()).await;

        assert!(result.is_ok(), "Platform login failed: {:?}", result.err());
    }

    #[tokio::test]
    async fn test_platform_login_account_mismatch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oauth/ffxivarr/login/top"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PLATFORM_TOP_PAGE))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_REPLY))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credentials = Credentials::new("SomeoneElse", "pw", "");
        let result = client.oauth_login(&credentials, &platform_params()).await;

        match result {
            Err(LauncherError::PlatformAccountMismatch { requested, linked }) => {
                assert_eq!(requested, "SomeoneElse");
                assert_eq!(linked, "LinkedPlayer");
            }
            other => panic!("Expected PlatformAccountMismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TOP_PAGE))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("window.external.user(\"login=auth,ng,err,bad\");"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credentials = Credentials::new("player", "wrong", "");
        let result = client.oauth_login(&credentials, &params()).await;

        assert!(matches!(result, Err(LauncherError::CredentialsRejected { .. })));
    }
}
