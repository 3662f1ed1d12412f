use std::collections::BTreeSet;
use std::str::FromStr;

use uuid::Uuid;

use crate::UnknownVariant;

/// The four supported question shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    /// Free-form integer answer.
    Integer,
    /// Multiple-correct choice with partial credit.
    Mcq,
    /// Single-correct choice.
    Scq,
    /// Match-the-column; graded all-or-nothing over the selected option set.
    Match,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Integer => "integer",
            QuestionType::Mcq => "mcq",
            QuestionType::Scq => "scq",
            QuestionType::Match => "match_the_column",
        }
    }
}

impl FromStr for QuestionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integer" => Ok(QuestionType::Integer),
            "mcq" => Ok(QuestionType::Mcq),
            "scq" => Ok(QuestionType::Scq),
            "match_the_column" => Ok(QuestionType::Match),
            other => Err(UnknownVariant {
                field: "question_type",
                value: other.to_string(),
            }),
        }
    }
}

/// The answer key of a question, one variant per shape.
///
/// A question row whose key columns are incomplete projects to no `AnswerKey`
/// at all; grading then falls back to the per-type unkeyed policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    Integer {
        answer: i64,
    },
    MultiChoice {
        options: Vec<String>,
        correct: BTreeSet<usize>,
    },
    SingleChoice {
        options: Vec<String>,
        correct: usize,
    },
    MatchColumns {
        options: Vec<String>,
        correct: Vec<usize>,
    },
}

/// The projection of a question that the scoring evaluator operates on.
///
/// Deliberately not the full question row: workers grade thousands of
/// submissions and only need the type tag, the marks and the key.
#[derive(Debug, Clone)]
pub struct GradableQuestion {
    pub id: Uuid,
    pub question_type: QuestionType,
    pub marks: i32,
    pub key: Option<AnswerKey>,
}
