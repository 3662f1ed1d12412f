//! Leaderboard rows: the worker-side upsert and the grading-side rank and
//! rating writes.

use drona_core::LeaderboardRow;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::rows::LeaderboardRowDb;
use crate::StoreError;

const ROW_COLUMNS: &str = "id, user_id, contest_id, score, rank, rating_before, rating_after, \
                           rating_delta, missed, accuracy, total_questions, attempted, \
                           unattempted, correct, incorrect, total_time, created_at";

/// Everything a submission worker writes for one (user, contest).
///
/// `rank` is deliberately absent: insertion seeds it with 0 and the conflict
/// arm never touches it, because the grading worker owns that column.
#[derive(Debug, Clone)]
pub struct LeaderboardUpsert {
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub score: i32,
    pub accuracy: f64,
    pub total_questions: i32,
    pub attempted: i32,
    pub unattempted: i32,
    pub correct: i32,
    pub incorrect: i32,
    pub total_time: i32,
    /// The user's rating at write time; grading later overwrites the
    /// after/delta columns.
    pub rating_before: i32,
}

pub async fn upsert(conn: &mut PgConnection, row: &LeaderboardUpsert) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO contest_leaderboard \
         (user_id, contest_id, score, rank, rating_before, rating_after, rating_delta, missed, \
          accuracy, total_questions, attempted, unattempted, correct, incorrect, total_time) \
         VALUES ($1, $2, $3, 0, $4, $4, 0, FALSE, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (user_id, contest_id) DO UPDATE SET \
           score = EXCLUDED.score, \
           rating_before = EXCLUDED.rating_before, \
           rating_after = EXCLUDED.rating_after, \
           rating_delta = EXCLUDED.rating_delta, \
           missed = EXCLUDED.missed, \
           accuracy = EXCLUDED.accuracy, \
           total_questions = EXCLUDED.total_questions, \
           attempted = EXCLUDED.attempted, \
           unattempted = EXCLUDED.unattempted, \
           correct = EXCLUDED.correct, \
           incorrect = EXCLUDED.incorrect, \
           total_time = EXCLUDED.total_time",
    )
    .bind(row.user_id)
    .bind(row.contest_id)
    .bind(row.score)
    .bind(row.rating_before)
    .bind(row.accuracy)
    .bind(row.total_questions)
    .bind(row.attempted)
    .bind(row.unattempted)
    .bind(row.correct)
    .bind(row.incorrect)
    .bind(row.total_time)
    .execute(conn)
    .await?;
    Ok(())
}

/// All rows of a contest ordered for rank assignment.
pub async fn rows_by_score_desc(
    conn: &mut PgConnection,
    contest_id: Uuid,
) -> Result<Vec<LeaderboardRow>, StoreError> {
    let rows = sqlx::query_as::<_, LeaderboardRowDb>(&format!(
        "SELECT {ROW_COLUMNS} FROM contest_leaderboard WHERE contest_id = $1 ORDER BY score DESC"
    ))
    .bind(contest_id)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(LeaderboardRowDb::into_row).collect())
}

/// How many contests the user has rows for besides this one.
pub async fn contests_played(
    conn: &mut PgConnection,
    user_id: Uuid,
    excluding_contest: Uuid,
) -> Result<i64, StoreError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM contest_leaderboard WHERE user_id = $1 AND contest_id <> $2",
    )
    .bind(user_id)
    .bind(excluding_contest)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

pub async fn set_rank(conn: &mut PgConnection, row_id: Uuid, rank: i32) -> Result<(), StoreError> {
    sqlx::query("UPDATE contest_leaderboard SET rank = $2 WHERE id = $1")
        .bind(row_id)
        .bind(rank)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn apply_rating(
    conn: &mut PgConnection,
    row_id: Uuid,
    rating_before: i32,
    rating_after: i32,
    rating_delta: i32,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE contest_leaderboard \
         SET rating_before = $2, rating_after = $3, rating_delta = $4 WHERE id = $1",
    )
    .bind(row_id)
    .bind(rating_before)
    .bind(rating_after)
    .bind(rating_delta)
    .execute(conn)
    .await?;
    Ok(())
}
