use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::AuthError;

/// Distinguishes the short-lived access token from the long-lived refresh
/// token; carried as the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user id.
    pub sub: Uuid,
    /// The session this token is bound to.
    pub session_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// HS256 signer/verifier for both token kinds.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> TokenSigner {
        TokenSigner {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_access(&self, user_id: Uuid, session_id: Uuid) -> Result<String, AuthError> {
        self.issue(user_id, session_id, TokenKind::Access, self.access_ttl)
    }

    pub fn issue_refresh(&self, user_id: Uuid, session_id: Uuid) -> Result<String, AuthError> {
        self.issue(user_id, session_id, TokenKind::Refresh, self.refresh_ttl)
    }

    fn issue(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id,
            session_id,
            kind,
            exp: Utc::now().timestamp() + ttl.as_secs() as i64,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::TokenEncoding)
    }

    /// Decode and verify a token, rejecting the wrong kind. Signature,
    /// structure and expiry failures all collapse to `Unauthorized`.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AuthError::Unauthorized("invalid or expired token"))?;
        if data.claims.kind != expected {
            return Err(AuthError::Unauthorized("wrong token type"));
        }
        Ok(data.claims)
    }
}

/// SHA-256 hex fingerprint of a refresh token; only this is persisted.
pub fn refresh_token_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(
            "test-secret",
            Duration::from_secs(3600),
            Duration::from_secs(86400),
        )
    }

    #[test]
    fn access_token_round_trips() {
        let signer = signer();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let token = signer.issue_access(user_id, session_id).unwrap();
        let claims = signer.verify(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.session_id, session_id);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn refresh_token_is_not_accepted_as_access() {
        let signer = signer();
        let token = signer
            .issue_refresh(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();
        let err = signer.verify(&token, TokenKind::Access).unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let ours = signer();
        let theirs = TokenSigner::new(
            "other-secret",
            Duration::from_secs(3600),
            Duration::from_secs(86400),
        );
        let token = theirs
            .issue_access(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();
        assert!(ours.verify(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(signer().verify("not-a-jwt", TokenKind::Access).is_err());
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let a = refresh_token_fingerprint("token");
        let b = refresh_token_fingerprint("token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, refresh_token_fingerprint("other"));
    }
}
