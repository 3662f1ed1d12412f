use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A device session. At most one session per user is *active* at a time; the
/// KV mirror `active_session:{user_id}` names it.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 hex digest of the refresh token; the token itself is never
    /// stored.
    pub refresh_token_hash: String,
    pub push_token: Option<String>,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at > now
    }
}
