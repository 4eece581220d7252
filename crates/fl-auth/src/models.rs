use serde::{Deserialize, Deserializer, Serialize};

use crate::patch_list::PatchListEntry;

/// Outcome of a login attempt, drives what the front-end does next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginState {
    /// Session registered, game may be launched
    Ok,
    /// Account has no active subscription
    NoService,
    /// Terms of service have not been accepted
    NoTerms,
    /// Game patches are pending
    NeedsPatchGame,
    /// The boot tooling must be patched before the game can be checked
    NeedsPatchBoot,
    /// Login servers are closed
    NoLogin,
}

/// Session parameters returned by the OAuth login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OauthLoginResult {
    pub session_id: String,
    pub region: u32,
    pub terms_accepted: bool,
    pub playable: bool,
    pub max_expansion: u32,
}

/// Complete result of one login attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResult {
    pub state: LoginState,
    pub pending_patches: Vec<PatchListEntry>,
    pub oauth_login: Option<OauthLoginResult>,
    pub unique_id: Option<String>,
}

impl LoginResult {
    /// Result for a flow that stopped before a session was registered
    pub(crate) fn stopped(state: LoginState, oauth_login: Option<OauthLoginResult>) -> Self {
        Self {
            state,
            pending_patches: Vec::new(),
            oauth_login,
            unique_id: None,
        }
    }
}

/// Gate (world entry) status from the frontier site
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GateStatus {
    #[serde(deserialize_with = "bool_from_int")]
    pub status: bool,
    #[serde(default)]
    pub message: Vec<String>,
    #[serde(default)]
    pub news: Vec<String>,
}

fn bool_from_int<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrBool {
        Int(i64),
        Bool(bool),
    }

    Ok(match IntOrBool::deserialize(deserializer)? {
        IntOrBool::Int(n) => n != 0,
        IntOrBool::Bool(b) => b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_status_numeric() {
        let status: GateStatus =
            serde_json::from_str(r#"{"status":1,"message":["maintenance soon"],"news":[]}"#).unwrap();
        assert!(status.status);
        assert_eq!(status.message, vec!["maintenance soon"]);
    }

    #[test]
    fn test_gate_status_closed_minimal() {
        let status: GateStatus = serde_json::from_str(r#"{"status":0}"#).unwrap();
        assert!(!status.status);
        assert!(status.message.is_empty());
        assert!(status.news.is_empty());
    }

    #[test]
    fn test_gate_status_boolean() {
        let status: GateStatus = serde_json::from_str(r#"{"status":true}"#).unwrap();
        assert!(status.status);
    }
}
