//! Core domain types for the Drona contest backend.
//!
//! This crate is intentionally small: records, enums and wire payloads shared
//! by the store, the workers and the API, with no I/O of its own.

mod attempt;
mod batch;
mod contest;
mod leaderboard;
mod question;
mod session;
mod title;
mod user;

pub use attempt::Attempt;
pub use batch::{SubmissionBatch, SubmittedAnswer};
pub use contest::{Contest, ContestStatus};
pub use leaderboard::LeaderboardRow;
pub use question::{AnswerKey, GradableQuestion, QuestionType};
pub use session::Session;
pub use title::Title;
pub use user::{User, UserRole};

/// Error for enum values read back from storage that no longer parse.
#[derive(Debug, thiserror::Error)]
#[error("unknown {field} value: {value}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}
