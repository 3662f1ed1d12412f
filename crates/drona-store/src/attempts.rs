//! Append-only attempt records.

use drona_core::Attempt;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::rows::AttemptRow;
use crate::StoreError;

#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub user_answer: Vec<String>,
    pub is_correct: bool,
    pub marks_obtained: i32,
    pub time_taken: i32,
    pub hint_used: bool,
}

/// Insert one attempt inside the worker's batch transaction.
pub async fn insert(conn: &mut PgConnection, attempt: &NewAttempt) -> Result<Attempt, StoreError> {
    let row = sqlx::query_as::<_, AttemptRow>(
        "INSERT INTO question_attempts \
         (user_id, question_id, user_answer, is_correct, marks_obtained, time_taken, hint_used) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, user_id, question_id, user_answer, is_correct, marks_obtained, \
                   time_taken, hint_used, attempted_at",
    )
    .bind(attempt.user_id)
    .bind(attempt.question_id)
    .bind(&attempt.user_answer)
    .bind(attempt.is_correct)
    .bind(attempt.marks_obtained)
    .bind(attempt.time_taken)
    .bind(attempt.hint_used)
    .fetch_one(conn)
    .await?;
    Ok(row.into_attempt())
}
