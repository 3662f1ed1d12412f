use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One evaluated answer for (user, question). Append-only: created by a
/// submission worker, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    /// The option texts (or integer literal) the user submitted, in order.
    pub user_answer: Vec<String>,
    pub is_correct: bool,
    pub marks_obtained: i32,
    /// Seconds spent on this question.
    pub time_taken: i32,
    pub hint_used: bool,
    pub attempted_at: DateTime<Utc>,
}
