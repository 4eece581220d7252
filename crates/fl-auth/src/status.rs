use chrono::Utc;
use tracing::instrument;

use crate::client::LauncherClient;
use crate::errors::{LauncherError, Result};
use crate::models::GateStatus;

/// Offset of the status digit in `{"status":N}`
const LOGIN_STATUS_DIGIT_OFFSET: usize = 10;

impl LauncherClient {
    /// Whether worlds are accepting players, for the configured language
    #[instrument(skip(self))]
    pub async fn gate_status(&self) -> Result<GateStatus> {
        let url = format!(
            "{}?lang={}&_={}",
            self.config.endpoints.gate_status,
            self.config.language.code(),
            Utc::now().timestamp_millis()
        );

        let text = self.download_as_launcher(&url).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Whether the login servers are open
    #[instrument(skip(self))]
    pub async fn login_status(&self) -> Result<bool> {
        let url = format!(
            "{}?_={}",
            self.config.endpoints.login_status,
            Utc::now().timestamp_millis()
        );

        let text = self.download_as_launcher(&url).await?;
        parse_login_status(&text)
    }
}

/// Read the single status digit at its fixed offset
pub fn parse_login_status(body: &str) -> Result<bool> {
    body.chars()
        .nth(LOGIN_STATUS_DIGIT_OFFSET)
        .and_then(|c| c.to_digit(10))
        .map(|digit| digit != 0)
        .ok_or_else(|| LauncherError::protocol("Login status digit missing", body))
}
