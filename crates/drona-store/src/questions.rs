//! Question loading: the gradable projection for workers, and the public
//! detail shape returned by the contest read endpoint.

use std::collections::HashMap;

use drona_core::GradableQuestion;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::rows::QuestionRow;
use crate::StoreError;

/// Question as shown to contestants: no answer key columns.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionDetail {
    pub id: Uuid,
    pub question_type: String,
    pub question_text: String,
    pub marks: i32,
    pub mcq_options: Option<Vec<String>>,
    pub scq_options: Option<Vec<String>>,
}

/// Bulk-load the gradable projections for a batch, keyed by question id.
///
/// Rows that fail to project (unknown type tag) are logged and skipped; the
/// worker counts the affected submissions as failed, same as a missing row.
pub async fn gradable_by_ids(
    conn: &mut PgConnection,
    question_ids: &[Uuid],
) -> Result<HashMap<Uuid, GradableQuestion>, StoreError> {
    let rows = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, question_type, marks, integer_answer, mcq_options, mcq_correct_option, \
                scq_options, scq_correct_option \
         FROM questions WHERE id = ANY($1)",
    )
    .bind(question_ids)
    .fetch_all(conn)
    .await?;

    let mut questions = HashMap::with_capacity(rows.len());
    for row in rows {
        let id = row.id;
        match row.into_gradable() {
            Ok(question) => {
                questions.insert(id, question);
            }
            Err(err) => {
                tracing::warn!(question_id = %id, error = %err, "skipping unreadable question row");
            }
        }
    }
    Ok(questions)
}
