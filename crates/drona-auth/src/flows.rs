use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use drona_kv::Kv;
use drona_store::Store;
use uuid::Uuid;

use crate::{
    refresh_token_fingerprint, verify_password, AuthError, TokenKind, TokenSigner,
};

/// Displaced sessions keep their force-logout marker for this long; plenty
/// for the old device's next poll.
const FORCE_LOGOUT_TTL: Duration = Duration::from_secs(300);

/// Result of a successful login: both tokens plus the session they bind to.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: Uuid,
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub access_token: String,
    pub session_id: Uuid,
}

/// Login / refresh / logout, with active-session rotation.
#[derive(Clone)]
pub struct AuthFlows {
    store: Store,
    kv: Kv,
    signer: TokenSigner,
    refresh_ttl: Duration,
}

impl AuthFlows {
    pub fn new(store: Store, kv: Kv, signer: TokenSigner, refresh_ttl: Duration) -> AuthFlows {
        AuthFlows {
            store,
            kv,
            signer,
            refresh_ttl,
        }
    }

    /// Phone + password login. A success supersedes whatever session was
    /// active: the new session becomes the KV-mirrored one and the displaced
    /// session is marked for forced logout.
    pub async fn login(&self, phone_number: &str, password: &str) -> Result<LoginGrant, AuthError> {
        let user = self
            .store
            .user_by_phone(phone_number)
            .await?
            .ok_or(AuthError::Unauthorized("invalid phone number or password"))?;
        if !user.is_active {
            return Err(AuthError::Unauthorized("account is inactive"));
        }
        let stored_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::Unauthorized("password login not set up"))?;
        if !verify_password(password, stored_hash) {
            return Err(AuthError::Unauthorized("invalid phone number or password"));
        }

        // Read the displaced session before the mirror is overwritten.
        let old_session = self.kv.active_session(user.id).await?;

        let session_id = Uuid::new_v4();
        let refresh_token = self.signer.issue_refresh(user.id, session_id)?;
        let expires_at = Utc::now()
            + ChronoDuration::seconds(self.refresh_ttl.as_secs() as i64);
        let session = self
            .store
            .insert_session(
                session_id,
                user.id,
                &refresh_token_fingerprint(&refresh_token),
                expires_at,
            )
            .await?;
        self.store
            .deactivate_other_sessions(user.id, session.id)
            .await?;

        self.kv
            .set_active_session(user.id, session.id, self.refresh_ttl)
            .await?;

        if let Some(old) = old_session.filter(|old| *old != session.id.to_string()) {
            match Uuid::parse_str(&old) {
                Ok(old_id) => {
                    self.kv.mark_force_logout(old_id, FORCE_LOGOUT_TTL).await?;
                    tracing::info!(
                        user_id = %user.id,
                        displaced_session = %old_id,
                        "competing login displaced an active session"
                    );
                }
                Err(_) => {
                    tracing::warn!(user_id = %user.id, value = %old, "unparseable active-session value");
                }
            }
        }

        let access_token = self.signer.issue_access(user.id, session.id)?;
        Ok(LoginGrant {
            access_token,
            refresh_token,
            session_id: session.id,
        })
    }

    /// Exchange a refresh token for a new access token. The session row is
    /// the source of truth; the KV mirror is re-synced when it drifted.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessGrant, AuthError> {
        let claims = self.signer.verify(refresh_token, TokenKind::Refresh)?;

        let session = self
            .store
            .session_by_id(claims.session_id)
            .await?
            .ok_or(AuthError::Unauthorized("session not found"))?;
        if !session.is_usable(Utc::now()) {
            return Err(AuthError::Unauthorized("session inactive or expired"));
        }
        if session.user_id != claims.sub {
            return Err(AuthError::Unauthorized("session does not belong to user"));
        }
        if refresh_token_fingerprint(refresh_token) != session.refresh_token_hash {
            return Err(AuthError::Unauthorized("refresh token mismatch"));
        }

        // KV is a cache here; a miss must not fail the refresh.
        match self.kv.active_session(session.user_id).await {
            Ok(Some(active)) if active == session.id.to_string() => {}
            Ok(_) => {
                if let Err(err) = self
                    .kv
                    .set_active_session(session.user_id, session.id, self.refresh_ttl)
                    .await
                {
                    tracing::warn!(error = %err, "failed to re-sync active session mirror");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "active session lookup failed during refresh");
            }
        }

        let user = self
            .store
            .user_by_id(session.user_id)
            .await?
            .ok_or(AuthError::Unauthorized("user not found"))?;
        if !user.is_active {
            return Err(AuthError::Unauthorized("account is inactive"));
        }

        let access_token = self.signer.issue_access(user.id, session.id)?;
        Ok(AccessGrant {
            access_token,
            session_id: session.id,
        })
    }

    /// Invalidate the current session and drop the KV mirror.
    pub async fn logout(&self, user_id: Uuid, session_id: Uuid) -> Result<(), AuthError> {
        self.store.close_session(session_id).await?;
        self.kv.clear_active_session(user_id).await?;
        Ok(())
    }
}
