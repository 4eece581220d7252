use serde::{Deserialize, Serialize};

/// Opaque platform ticket forwarded to the OAuth top page
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformTicket {
    pub text: String,
    pub length: usize,
}

impl std::fmt::Debug for PlatformTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformTicket")
            .field("text", &"[REDACTED]")
            .field("length", &self.length)
            .finish()
    }
}

/// Where a platform-mode login gets its ticket from
#[derive(Clone, PartialEq, Eq)]
pub enum PlatformLogin {
    /// Raw auth blob supplied by the caller, encrypted locally
    RawTicket(Vec<u8>),
    /// Ticket requested from the running platform client
    LiveSession,
}

impl std::fmt::Debug for PlatformLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RawTicket(raw) => write!(f, "RawTicket({} bytes)", raw.len()),
            Self::LiveSession => f.write_str("LiveSession"),
        }
    }
}

/// Produces platform tickets, either from a raw blob or a live platform session
#[async_trait::async_trait]
pub trait TicketProvider: Send + Sync {
    /// Encrypt a raw auth blob with the given UNIX timestamp
    fn encrypt_raw(&self, raw: &[u8], unix_time: i64) -> PlatformTicket;

    /// Whether the platform client is initialized and usable
    fn is_initialized(&self) -> bool;

    /// Whether the platform client reports a logged-in user
    fn is_logged_in(&self) -> bool;

    /// Request a fresh auth session ticket from the live platform session
    async fn session_ticket(&self) -> Option<PlatformTicket>;
}
