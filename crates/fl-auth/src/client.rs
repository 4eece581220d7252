use std::sync::Arc;

use chrono::{DateTime, Timelike, Utc};
use reqwest::{Client, Response};
use tracing::{debug, instrument};

use crate::config::{LauncherConfig, headers};
use crate::errors::{LauncherError, Result};
use crate::identity;
use crate::patch_list::{MultipartPatchListParser, PatchListParser};

/// HTTP client shared by every launcher operation
///
/// Cheap to clone; clones share the connection pool. No cookie store is
/// configured, every request is sent without cookies.
#[derive(Clone)]
pub struct LauncherClient {
    pub(crate) config: LauncherConfig,
    pub(crate) http: Client,
    pub(crate) user_agent: String,
    pub(crate) patch_list_parser: Arc<dyn PatchListParser>,
}

impl std::fmt::Debug for LauncherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LauncherClient")
            .field("config", &self.config)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl LauncherClient {
    /// Create a new launcher client
    pub fn new(config: LauncherConfig) -> Result<Self> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(identity::user_agent);

        let builder = Client::builder()
            .connect_timeout(config.http_timeouts.connect)
            .timeout(config.http_timeouts.request)
            .user_agent(user_agent.as_str());
        let http = apply_transport(builder, &config)?.build()?;

        Ok(Self {
            config,
            http,
            user_agent,
            patch_list_parser: Arc::new(MultipartPatchListParser),
        })
    }

    /// Swap the manifest parser used by the version checks
    pub fn with_patch_list_parser(mut self, parser: Arc<dyn PatchListParser>) -> Self {
        self.patch_list_parser = parser;
        self
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Referer pointing at the frontier index page for the configured language
    pub(crate) fn frontier_referer(&self) -> String {
        format!(
            "{}?rc_lang={}&time={}",
            self.config.endpoints.frontier_index,
            self.config.language.code(),
            frontier_time(Utc::now())
        )
    }

    /// GET a frontier resource with the headers the official launcher sends
    #[instrument(skip(self))]
    pub(crate) async fn download_as_launcher(&self, url: &str) -> Result<String> {
        debug!("Downloading as launcher");
        let response = self
            .http
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept-Encoding", headers::ACCEPT_ENCODING)
            .header("Accept-Language", headers::ACCEPT_LANGUAGE)
            .header("Origin", &self.config.endpoints.frontier_origin)
            .header("Referer", self.frontier_referer())
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(response.text().await?)
    }
}

/// Turn a non-2xx response into an `Http` error carrying a body snippet
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(LauncherError::Http {
        status,
        body_snippet: body.chars().take(200).collect(),
    })
}

/// `yyyy-MM-dd-HH-mm`, seconds dropped
pub(crate) fn frontier_time(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d-%H-%M").to_string()
}

/// `yyyy-MM-dd-HH-m0`, minute truncated to its tens digit
pub(crate) fn patch_time(now: DateTime<Utc>) -> String {
    let minute_tens = now.minute() / 10;
    format!("{}-{}0", now.format("%Y-%m-%d-%H"), minute_tens)
}

#[cfg(feature = "legacy-tls")]
fn apply_transport(
    builder: reqwest::ClientBuilder,
    config: &LauncherConfig,
) -> Result<reqwest::ClientBuilder> {
    use rustls::{CipherSuite, ClientConfig, crypto::ring};
    use rustls_platform_verifier::BuilderVerifierExt;

    if !config.transport.legacy_cipher_suite {
        return Ok(builder);
    }

    let mut provider = ring::default_provider();
    provider
        .cipher_suites
        .retain(|suite| suite.suite() == CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384);

    let tls_config = ClientConfig::builder_with_provider(Arc::new(provider))
        .with_protocol_versions(&[&rustls::version::TLS12])
        .map_err(|e| LauncherError::InvalidRequest(format!("TLS setup failed: {e}")))?
        .with_platform_verifier()
        .map_err(|e| LauncherError::InvalidRequest(format!("TLS verifier setup failed: {e}")))?
        .with_no_client_auth();

    debug!("Using legacy cipher suite transport");
    Ok(builder.use_preconfigured_tls(tls_config))
}

#[cfg(not(feature = "legacy-tls"))]
fn apply_transport(
    builder: reqwest::ClientBuilder,
    config: &LauncherConfig,
) -> Result<reqwest::ClientBuilder> {
    if config.transport.legacy_cipher_suite {
        tracing::warn!("Legacy cipher suite requested but built without the legacy-tls feature; using defaults");
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_frontier_time_drops_seconds() {
        let now = Utc.with_ymd_and_hms(2024, 7, 2, 9, 47, 31).unwrap();
        assert_eq!(frontier_time(now), "2024-07-02-09-47");
    }

    #[test]
    fn test_patch_time_rounds_minute() {
        let now = Utc.with_ymd_and_hms(2024, 7, 2, 9, 47, 31).unwrap();
        assert_eq!(patch_time(now), "2024-07-02-09-40");

        let early = Utc.with_ymd_and_hms(2024, 7, 2, 23, 3, 0).unwrap();
        assert_eq!(patch_time(early), "2024-07-02-23-00");
    }

    #[test]
    fn test_client_uses_configured_user_agent() {
        let config = LauncherConfig {
            user_agent: Some("test-agent".to_string()),
            ..LauncherConfig::default()
        };
        let client = LauncherClient::new(config).unwrap();
        assert_eq!(client.user_agent(), "test-agent");
    }

    #[test]
    fn test_referer_embeds_language() {
        let config = LauncherConfig::new(fl_install::ClientLanguage::German);
        let client = LauncherClient::new(config).unwrap();

        let referer = client.frontier_referer();
        assert!(referer.starts_with("https://launcher.finalfantasyxiv.com/v700/index.html?rc_lang=de&time="));
    }
}
