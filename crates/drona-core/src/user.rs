use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Title, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Student,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "admin" => Ok(UserRole::Admin),
            other => Err(UnknownVariant {
                field: "user_role",
                value: other.to_string(),
            }),
        }
    }
}

/// A participant. `current_rating` moves with every graded contest;
/// `max_rating` is the historical high and only ever rises.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub phone_number: String,
    /// PHC-format hash; `None` for accounts that predate password login.
    pub password_hash: Option<String>,
    pub name: String,
    pub current_rating: i32,
    pub max_rating: i32,
    pub title: Title,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
