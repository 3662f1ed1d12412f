use drona_core::User;
use drona_kv::Kv;
use drona_store::Store;
use uuid::Uuid;

use crate::{AuthError, TokenKind, TokenSigner};

/// A verified caller: the user plus the session their token is bound to.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user: User,
    pub session_id: Uuid,
}

/// Resolves a bearer token to a user while enforcing the single-active-session
/// rule. Every submission-creating endpoint goes through [`Authorizer::authorize`].
#[derive(Clone)]
pub struct Authorizer {
    store: Store,
    kv: Kv,
    signer: TokenSigner,
}

impl Authorizer {
    pub fn new(store: Store, kv: Kv, signer: TokenSigner) -> Authorizer {
        Authorizer { store, kv, signer }
    }

    /// Token → user, or the precise 401 the client should see.
    ///
    /// The force-logout and active-session reads go out in one KV pipeline;
    /// a pending force-logout marker is consumed by the call that observes it
    /// so the displaced device is told exactly once.
    pub async fn authorize(&self, bearer_token: &str) -> Result<AuthedUser, AuthError> {
        let claims = self.signer.verify(bearer_token, TokenKind::Access)?;

        let (force_logout, active_session) = self
            .kv
            .session_guard(claims.sub, claims.session_id)
            .await?;

        if force_logout {
            self.kv.clear_force_logout(claims.session_id).await?;
            tracing::info!(
                user_id = %claims.sub,
                session_id = %claims.session_id,
                "displaced session observed its force-logout marker"
            );
            return Err(AuthError::SessionExpired);
        }

        match active_session {
            Some(active) if active == claims.session_id.to_string() => {}
            _ => return Err(AuthError::SessionExpired),
        }

        let user = self
            .store
            .user_by_id(claims.sub)
            .await?
            .ok_or(AuthError::Unauthorized("user not found"))?;
        if !user.is_active {
            return Err(AuthError::Unauthorized("account is inactive"));
        }
        Ok(AuthedUser {
            user,
            session_id: claims.session_id,
        })
    }
}
