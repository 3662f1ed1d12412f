//! Postgres persistence for the contest pipeline.
//!
//! Row types live in [`rows`] and convert into `drona-core` records; the
//! query surface is split per entity. Operations that must share a worker
//! transaction take `&mut PgConnection`, everything else runs against the
//! pool through [`Store`].

pub mod attempts;
pub mod contests;
pub mod leaderboard;
pub mod questions;
pub mod rows;
pub mod sessions;
pub mod users;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use thiserror::Error;

pub use attempts::NewAttempt;
pub use contests::{ContestUpdate, NewContest};
pub use leaderboard::LeaderboardUpsert;
pub use questions::QuestionDetail;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("corrupt row: {0}")]
    Corrupt(#[from] drona_core::UnknownVariant),
}

/// Handle to the relational store. Clones share one pool.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect with a bounded pool and short acquire timeout.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Store, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        Ok(Store { pool })
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Open a transaction for a worker's batch or a contest grading run.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        Ok(self.pool.begin().await?)
    }
}
