//! `FromRow` projections and their conversions into domain records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use drona_core::{
    AnswerKey, Contest, ContestStatus, GradableQuestion, LeaderboardRow, QuestionType, Session,
    Title, User, UserRole,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::StoreError;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub phone_number: String,
    pub password_hash: Option<String>,
    pub name: String,
    pub current_rating: i32,
    pub max_rating: i32,
    pub title: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> Result<User, StoreError> {
        Ok(User {
            id: self.id,
            phone_number: self.phone_number,
            password_hash: self.password_hash,
            name: self.name,
            current_rating: self.current_rating,
            max_rating: self.max_rating,
            title: self.title.parse::<Title>()?,
            role: self.role.parse::<UserRole>()?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub push_token: Option<String>,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRow {
    pub fn into_session(self) -> Session {
        Session {
            id: self.id,
            user_id: self.user_id,
            refresh_token_hash: self.refresh_token_hash,
            push_token: self.push_token,
            is_active: self.is_active,
            expires_at: self.expires_at,
            last_active: self.last_active,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ContestRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub total_time: i32,
    pub status: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ContestRow {
    pub fn into_contest(self) -> Result<Contest, StoreError> {
        Ok(Contest {
            id: self.id,
            name: self.name,
            description: self.description,
            total_time: self.total_time,
            status: self.status.parse::<ContestStatus>()?,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub question_type: String,
    pub marks: i32,
    pub integer_answer: Option<i64>,
    pub mcq_options: Option<Vec<String>>,
    pub mcq_correct_option: Option<Vec<i32>>,
    pub scq_options: Option<Vec<String>>,
    pub scq_correct_option: Option<i32>,
}

impl QuestionRow {
    /// Project into what the evaluator needs. A row whose key columns are
    /// incomplete for its declared type keeps `key: None`; the evaluator's
    /// unkeyed policy takes over from there.
    pub fn into_gradable(self) -> Result<GradableQuestion, StoreError> {
        let question_type = self.question_type.parse::<QuestionType>()?;
        let key = match question_type {
            QuestionType::Integer => self.integer_answer.map(|answer| AnswerKey::Integer { answer }),
            QuestionType::Mcq => mcq_key(self.mcq_options, self.mcq_correct_option)
                .map(|(options, correct)| AnswerKey::MultiChoice { options, correct }),
            QuestionType::Scq => match (self.scq_options, self.scq_correct_option) {
                (Some(options), Some(correct)) if !options.is_empty() && correct >= 0 => {
                    Some(AnswerKey::SingleChoice {
                        options,
                        correct: correct as usize,
                    })
                }
                _ => None,
            },
            QuestionType::Match => mcq_key(self.mcq_options, self.mcq_correct_option)
                .map(|(options, correct)| AnswerKey::MatchColumns {
                    options,
                    correct: correct.into_iter().collect(),
                }),
        };
        Ok(GradableQuestion {
            id: self.id,
            question_type,
            marks: self.marks,
            key,
        })
    }
}

fn mcq_key(
    options: Option<Vec<String>>,
    correct: Option<Vec<i32>>,
) -> Option<(Vec<String>, BTreeSet<usize>)> {
    let options = options.filter(|o| !o.is_empty())?;
    let correct = correct.filter(|c| !c.is_empty())?;
    let indices = correct
        .into_iter()
        .map(|i| usize::try_from(i).ok())
        .collect::<Option<BTreeSet<usize>>>()?;
    Some((options, indices))
}

#[derive(Debug, FromRow)]
pub struct AttemptRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub user_answer: Vec<String>,
    pub is_correct: bool,
    pub marks_obtained: i32,
    pub time_taken: i32,
    pub hint_used: bool,
    pub attempted_at: DateTime<Utc>,
}

impl AttemptRow {
    pub fn into_attempt(self) -> drona_core::Attempt {
        drona_core::Attempt {
            id: self.id,
            user_id: self.user_id,
            question_id: self.question_id,
            user_answer: self.user_answer,
            is_correct: self.is_correct,
            marks_obtained: self.marks_obtained,
            time_taken: self.time_taken,
            hint_used: self.hint_used,
            attempted_at: self.attempted_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct LeaderboardRowDb {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub score: i32,
    pub rank: i32,
    pub rating_before: i32,
    pub rating_after: i32,
    pub rating_delta: i32,
    pub missed: bool,
    pub accuracy: f64,
    pub total_questions: i32,
    pub attempted: i32,
    pub unattempted: i32,
    pub correct: i32,
    pub incorrect: i32,
    pub total_time: i32,
    pub created_at: DateTime<Utc>,
}

impl LeaderboardRowDb {
    pub fn into_row(self) -> LeaderboardRow {
        LeaderboardRow {
            id: self.id,
            user_id: self.user_id,
            contest_id: self.contest_id,
            score: self.score,
            rank: self.rank,
            rating_before: self.rating_before,
            rating_after: self.rating_after,
            rating_delta: self.rating_delta,
            missed: self.missed,
            accuracy: self.accuracy,
            total_questions: self.total_questions,
            attempted: self.attempted,
            unattempted: self.unattempted,
            correct: self.correct,
            incorrect: self.incorrect,
            total_time: self.total_time,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_row(question_type: &str) -> QuestionRow {
        QuestionRow {
            id: Uuid::new_v4(),
            question_type: question_type.to_string(),
            marks: 4,
            integer_answer: None,
            mcq_options: None,
            mcq_correct_option: None,
            scq_options: None,
            scq_correct_option: None,
        }
    }

    #[test]
    fn integer_row_projects_its_answer() {
        let mut row = question_row("integer");
        row.integer_answer = Some(7);
        let q = row.into_gradable().unwrap();
        assert_eq!(q.key, Some(AnswerKey::Integer { answer: 7 }));
    }

    #[test]
    fn mcq_row_without_correct_options_has_no_key() {
        let mut row = question_row("mcq");
        row.mcq_options = Some(vec!["a".into(), "b".into()]);
        let q = row.into_gradable().unwrap();
        assert_eq!(q.key, None);
    }

    #[test]
    fn mcq_row_with_negative_index_has_no_key() {
        let mut row = question_row("mcq");
        row.mcq_options = Some(vec!["a".into(), "b".into()]);
        row.mcq_correct_option = Some(vec![0, -1]);
        let q = row.into_gradable().unwrap();
        assert_eq!(q.key, None);
    }

    #[test]
    fn match_row_keeps_duplicate_correct_indices_sorted_away() {
        let mut row = question_row("match_the_column");
        row.mcq_options = Some(vec!["a".into(), "b".into(), "c".into()]);
        row.mcq_correct_option = Some(vec![2, 0]);
        let q = row.into_gradable().unwrap();
        match q.key {
            Some(AnswerKey::MatchColumns { correct, .. }) => {
                assert_eq!(correct, vec![0, 2]);
            }
            other => panic!("expected a match key, got {other:?}"),
        }
    }

    #[test]
    fn scq_row_projects_single_correct_index() {
        let mut row = question_row("scq");
        row.scq_options = Some(vec!["a".into(), "b".into()]);
        row.scq_correct_option = Some(1);
        let q = row.into_gradable().unwrap();
        assert_eq!(
            q.key,
            Some(AnswerKey::SingleChoice {
                options: vec!["a".into(), "b".into()],
                correct: 1
            })
        );
    }

    #[test]
    fn unknown_question_type_is_a_corrupt_row() {
        let row = question_row("essay");
        assert!(matches!(
            row.into_gradable(),
            Err(StoreError::Corrupt(_))
        ));
    }
}
