use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One submission queue item: everything a single user submitted for a single
/// contest, pushed onto `contest:submissions:{contest_id}` as one JSON value.
///
/// A user submitting twice produces two independent batches; the leaderboard
/// upsert makes the last committed batch win.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionBatch {
    pub contest_id: Uuid,
    pub user_id: Uuid,
    pub submissions: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    /// Selected option texts (or the integer literal), not indices.
    pub user_answer: Vec<String>,
    /// Seconds spent on this question.
    pub time_taken: i32,
    #[serde(default)]
    pub hint_used: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_round_trips_as_json() {
        let batch = SubmissionBatch {
            contest_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            submissions: vec![SubmittedAnswer {
                question_id: Uuid::new_v4(),
                user_answer: vec!["42".to_string()],
                time_taken: 17,
                hint_used: true,
            }],
        };
        let json = serde_json::to_string(&batch).unwrap();
        let back: SubmissionBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, batch);
    }

    #[test]
    fn hint_used_defaults_to_false() {
        let json = r#"{
            "question_id": "8f14e45f-ceea-4e17-a0f7-1f8d7a2e6a3b",
            "user_answer": ["a", "c"],
            "time_taken": 30
        }"#;
        let answer: SubmittedAnswer = serde_json::from_str(json).unwrap();
        assert!(!answer.hint_used);
    }
}
