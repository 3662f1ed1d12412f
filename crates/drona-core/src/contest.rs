use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::UnknownVariant;

/// Contest lifecycle. Transitions are monotone; `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContestStatus {
    NotStarted,
    Active,
    Finished,
}

impl ContestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContestStatus::NotStarted => "not_started",
            ContestStatus::Active => "active",
            ContestStatus::Finished => "finished",
        }
    }

    /// Whether `next` is a legal transition from `self`.
    pub fn can_become(self, next: ContestStatus) -> bool {
        use ContestStatus::*;
        matches!(
            (self, next),
            (NotStarted, Active) | (NotStarted, Finished) | (Active, Finished)
        )
    }
}

impl FromStr for ContestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(ContestStatus::NotStarted),
            "active" => Ok(ContestStatus::Active),
            "finished" => Ok(ContestStatus::Finished),
            other => Err(UnknownVariant {
                field: "contest_status",
                value: other.to_string(),
            }),
        }
    }
}

/// A scheduled contest. Question membership lives in the
/// `contest_questions` link table, not here.
#[derive(Debug, Clone)]
pub struct Contest {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Allotted duration in seconds.
    pub total_time: i32,
    pub status: ContestStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_are_monotone() {
        use ContestStatus::*;
        assert!(NotStarted.can_become(Active));
        assert!(Active.can_become(Finished));
        assert!(!Finished.can_become(Active));
        assert!(!Active.can_become(NotStarted));
        assert!(!Finished.can_become(NotStarted));
    }
}
