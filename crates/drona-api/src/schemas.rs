//! Request and response bodies for the HTTP surface.

use chrono::{DateTime, Utc};
use drona_core::Contest;
use drona_store::QuestionDetail;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- auth ------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub session_id: Uuid,
}

// --- contests --------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateContestRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Allotted duration in seconds.
    pub total_time: i32,
    /// Initial lifecycle state; defaults to `not_started`.
    #[serde(default)]
    pub status: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub question_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContestRequest {
    #[serde(default)]
    pub total_time: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ContestResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub total_time: i32,
    pub status: &'static str,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Contest> for ContestResponse {
    fn from(contest: Contest) -> ContestResponse {
        ContestResponse {
            id: contest.id,
            name: contest.name,
            description: contest.description,
            total_time: contest.total_time,
            status: contest.status.as_str(),
            starts_at: contest.starts_at,
            ends_at: contest.ends_at,
            created_at: contest.created_at,
        }
    }
}

/// Contest question as shown to contestants; answer keys never leave the
/// store layer.
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub question_type: String,
    pub question_text: String,
    pub marks: i32,
    pub mcq_options: Option<Vec<String>>,
    pub scq_options: Option<Vec<String>>,
}

impl From<QuestionDetail> for QuestionResponse {
    fn from(question: QuestionDetail) -> QuestionResponse {
        QuestionResponse {
            id: question.id,
            question_type: question.question_type,
            question_text: question.question_text,
            marks: question.marks,
            mcq_options: question.mcq_options,
            scq_options: question.scq_options,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContestWithQuestionsResponse {
    #[serde(flatten)]
    pub contest: ContestResponse,
    pub questions: Vec<QuestionResponse>,
}

// --- submissions -----------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub submissions: Vec<SubmissionItem>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionItem {
    pub question_id: Uuid,
    pub user_answer: Vec<String>,
    /// Seconds spent on this question.
    pub time_taken: i32,
    #[serde(default)]
    pub hint_used: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitAccepted {
    pub status: &'static str,
    pub contest_id: Uuid,
    pub queued: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_items_default_hint_used() {
        let json = r#"{
            "submissions": [
                {
                    "question_id": "4f3c2a1b-0d9e-4c8b-a7f6-5e4d3c2b1a09",
                    "user_answer": ["7"],
                    "time_taken": 12
                }
            ]
        }"#;
        let request: SubmitRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.submissions.len(), 1);
        assert!(!request.submissions[0].hint_used);
    }

    #[test]
    fn contest_with_questions_flattens_the_contest() {
        let response = ContestWithQuestionsResponse {
            contest: ContestResponse {
                id: Uuid::new_v4(),
                name: "Weekly 12".to_string(),
                description: None,
                total_time: 3600,
                status: "active",
                starts_at: Utc::now(),
                ends_at: Utc::now(),
                created_at: Utc::now(),
            },
            questions: Vec::new(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "active");
        assert!(value["questions"].as_array().unwrap().is_empty());
        assert!(value.get("contest").is_none(), "contest must be flattened");
    }
}
