//! Contest rows and the contest-question link table.

use chrono::{DateTime, Utc};
use drona_core::{Contest, ContestStatus};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::questions::QuestionDetail;
use crate::rows::ContestRow;
use crate::{Store, StoreError};

const CONTEST_COLUMNS: &str =
    "id, name, description, total_time, status, starts_at, ends_at, created_at";

/// Payload for contest creation; the question bag becomes link rows.
#[derive(Debug, Clone)]
pub struct NewContest {
    pub name: String,
    pub description: Option<String>,
    pub total_time: i32,
    pub status: ContestStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub question_ids: Vec<Uuid>,
}

/// Partial contest update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ContestUpdate {
    pub total_time: Option<i32>,
    pub status: Option<ContestStatus>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl Store {
    /// Insert the contest and its question links in one transaction.
    pub async fn create_contest(&self, new: &NewContest) -> Result<Contest, StoreError> {
        let mut tx = self.begin().await?;
        let row = sqlx::query_as::<_, ContestRow>(&format!(
            "INSERT INTO contests (name, description, total_time, status, starts_at, ends_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CONTEST_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.total_time)
        .bind(new.status.as_str())
        .bind(new.starts_at)
        .bind(new.ends_at)
        .fetch_one(&mut *tx)
        .await?;

        for question_id in &new.question_ids {
            sqlx::query(
                "INSERT INTO contest_questions (contest_id, question_id) VALUES ($1, $2)",
            )
            .bind(row.id)
            .bind(question_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        row.into_contest()
    }

    pub async fn contest_by_id(&self, id: Uuid) -> Result<Option<Contest>, StoreError> {
        let mut conn = self.pool().acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Apply a partial update; returns the new row or `None` if the contest
    /// does not exist.
    pub async fn update_contest(
        &self,
        id: Uuid,
        update: &ContestUpdate,
    ) -> Result<Option<Contest>, StoreError> {
        let row = sqlx::query_as::<_, ContestRow>(&format!(
            "UPDATE contests SET \
               total_time = COALESCE($2, total_time), \
               status = COALESCE($3, status), \
               starts_at = COALESCE($4, starts_at), \
               ends_at = COALESCE($5, ends_at) \
             WHERE id = $1 RETURNING {CONTEST_COLUMNS}"
        ))
        .bind(id)
        .bind(update.total_time)
        .bind(update.status.map(ContestStatus::as_str))
        .bind(update.starts_at)
        .bind(update.ends_at)
        .fetch_optional(self.pool())
        .await?;
        row.map(ContestRow::into_contest).transpose()
    }

    /// Questions linked to a contest, in a public (answer-key-free) shape.
    pub async fn contest_questions(
        &self,
        contest_id: Uuid,
    ) -> Result<Vec<QuestionDetail>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionDetail>(
            "SELECT q.id, q.question_type, q.question_text, q.marks, q.mcq_options, q.scq_options \
             FROM questions q \
             JOIN contest_questions cq ON cq.question_id = q.id \
             WHERE cq.contest_id = $1",
        )
        .bind(contest_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}

/// Transaction-scoped contest lookup.
pub async fn fetch(conn: &mut PgConnection, id: Uuid) -> Result<Option<Contest>, StoreError> {
    let row = sqlx::query_as::<_, ContestRow>(&format!(
        "SELECT {CONTEST_COLUMNS} FROM contests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    row.map(ContestRow::into_contest).transpose()
}

/// Number of questions linked to the contest.
pub async fn question_count(conn: &mut PgConnection, contest_id: Uuid) -> Result<i64, StoreError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM contest_questions WHERE contest_id = $1")
            .bind(contest_id)
            .fetch_one(conn)
            .await?;
    Ok(count)
}
