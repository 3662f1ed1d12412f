use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The single mutable aggregate per (user, contest).
///
/// Submission workers own every field except `rank`; the grading worker owns
/// `rank` and overwrites the rating columns once the contest is quiesced.
#[derive(Debug, Clone)]
pub struct LeaderboardRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub score: i32,
    /// 0 until the grading worker assigns standard competition ranks.
    pub rank: i32,
    pub rating_before: i32,
    pub rating_after: i32,
    pub rating_delta: i32,
    pub missed: bool,
    /// correct / attempted × 100, or 0 when nothing was attempted.
    pub accuracy: f64,
    pub total_questions: i32,
    pub attempted: i32,
    pub unattempted: i32,
    pub correct: i32,
    pub incorrect: i32,
    /// Seconds summed over the user's submissions.
    pub total_time: i32,
    pub created_at: DateTime<Utc>,
}
