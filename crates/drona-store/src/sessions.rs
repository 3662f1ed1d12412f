//! Session rows backing the single-active-session rule. The KV mirror names
//! the active session; these rows are the durable source of truth.

use chrono::{DateTime, Utc};
use drona_core::Session;
use uuid::Uuid;

use crate::rows::SessionRow;
use crate::{Store, StoreError};

const SESSION_COLUMNS: &str = "id, user_id, refresh_token_hash, push_token, is_active, \
                               expires_at, last_active, created_at";

impl Store {
    /// Insert a session under a caller-chosen id: the refresh token embeds
    /// the session id, so the id exists before the row does.
    pub async fn insert_session(
        &self,
        id: Uuid,
        user_id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "INSERT INTO user_sessions (id, user_id, refresh_token_hash, expires_at) \
             VALUES ($1, $2, $3, $4) RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .fetch_one(self.pool())
        .await?;
        Ok(row.into_session())
    }

    pub async fn session_by_id(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(SessionRow::into_session))
    }

    /// One batch update deactivating every other session of the user; the
    /// displaced devices fail closed on their next authorized call.
    pub async fn deactivate_other_sessions(
        &self,
        user_id: Uuid,
        keep_session_id: Uuid,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_active = FALSE \
             WHERE user_id = $1 AND id <> $2 AND is_active",
        )
        .bind(user_id)
        .bind(keep_session_id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    /// Logout: deactivate the session and drop its push token.
    pub async fn close_session(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE user_sessions SET is_active = FALSE, push_token = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
