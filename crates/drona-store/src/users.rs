//! User queries: lookup for auth, rating standings and rating writes for the
//! grading worker.

use drona_core::{Title, User};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::rows::UserRow;
use crate::{Store, StoreError};

const USER_COLUMNS: &str = "id, phone_number, password_hash, name, current_rating, max_rating, \
                            title, role, is_active, created_at, updated_at";

impl Store {
    pub async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        row.map(UserRow::into_user).transpose()
    }

    pub async fn user_by_phone(&self, phone_number: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone_number = $1"
        ))
        .bind(phone_number)
        .fetch_optional(self.pool())
        .await?;
        row.map(UserRow::into_user).transpose()
    }
}

/// Transaction-scoped user lookup for the submission worker.
pub async fn fetch(conn: &mut PgConnection, id: Uuid) -> Result<Option<User>, StoreError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    row.map(UserRow::into_user).transpose()
}

/// The slice of a user the rating engine needs.
#[derive(Debug, FromRow)]
pub struct RatingStanding {
    pub user_id: Uuid,
    pub current_rating: i32,
    pub max_rating: i32,
}

pub async fn rating_standings(
    conn: &mut PgConnection,
    user_ids: &[Uuid],
) -> Result<Vec<RatingStanding>, StoreError> {
    let standings = sqlx::query_as::<_, RatingStanding>(
        "SELECT id AS user_id, current_rating, max_rating FROM users WHERE id = ANY($1)",
    )
    .bind(user_ids)
    .fetch_all(conn)
    .await?;
    Ok(standings)
}

/// Write a user's post-contest rating. `max_rating` only ever rises and the
/// title is derived from the new maximum.
pub async fn set_rating(
    conn: &mut PgConnection,
    user_id: Uuid,
    current_rating: i32,
    max_rating: i32,
) -> Result<(), StoreError> {
    let title = Title::from_max_rating(max_rating);
    sqlx::query(
        "UPDATE users SET current_rating = $2, max_rating = $3, title = $4, updated_at = now() \
         WHERE id = $1",
    )
    .bind(user_id)
    .bind(current_rating)
    .bind(max_rating)
    .bind(title.as_str())
    .execute(conn)
    .await?;
    Ok(())
}
