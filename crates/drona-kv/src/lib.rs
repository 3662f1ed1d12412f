//! Redis-backed primitives for the contest pipeline: per-contest submission
//! lists with atomic blocking pops, the advisory grading list, and the
//! active-session / force-logout coherence keys.
//!
//! `BRPOP` is the only concurrency primitive the pipeline relies on: each
//! enqueued batch is delivered to exactly one worker.

pub mod keys;

use std::time::Duration;

use drona_core::SubmissionBatch;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("malformed queue payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Handle to the shared key/value store. Cheap to clone; every binary builds
/// one at startup and passes it to the components that need it.
#[derive(Clone)]
pub struct Kv {
    manager: ConnectionManager,
}

impl Kv {
    /// Connect and start the managed (auto-reconnecting) connection.
    pub async fn connect(url: &str) -> Result<Kv, KvError> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Kv { manager })
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }

    // --- submission queues -------------------------------------------------

    /// Push one user-batch onto its contest's submission list.
    pub async fn enqueue_batch(&self, batch: &SubmissionBatch) -> Result<(), KvError> {
        let payload = serde_json::to_string(batch)?;
        let key = keys::submission_queue(batch.contest_id);
        let mut conn = self.conn();
        conn.lpush::<_, _, ()>(&key, payload).await?;
        Ok(())
    }

    /// Atomic blocking right-pop of one batch. Returns `None` on timeout.
    pub async fn pop_batch(
        &self,
        queue: &str,
        timeout: Duration,
    ) -> Result<Option<SubmissionBatch>, KvError> {
        let mut conn = self.conn();
        let popped: Option<(String, String)> =
            conn.brpop(queue, timeout.as_secs_f64()).await?;
        match popped {
            Some((_queue, payload)) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub async fn queue_len(&self, queue: &str) -> Result<usize, KvError> {
        let mut conn = self.conn();
        Ok(conn.llen(queue).await?)
    }

    /// Every submission queue key, empty or not, via a cursor-based scan.
    pub async fn submission_queues(&self) -> Result<Vec<String>, KvError> {
        self.scan_keys(keys::SUBMISSION_QUEUE_PATTERN).await
    }

    /// Submission queue keys that currently hold at least one batch.
    pub async fn active_submission_queues(&self) -> Result<Vec<String>, KvError> {
        let mut active = Vec::new();
        for queue in self.submission_queues().await? {
            if self.queue_len(&queue).await? > 0 {
                active.push(queue);
            }
        }
        Ok(active)
    }

    /// Advisory handoff: note that a contest's queue drained.
    pub async fn announce_drained(&self, contest_id: Uuid) -> Result<(), KvError> {
        let mut conn = self.conn();
        conn.lpush::<_, _, ()>(keys::GRADING_QUEUE, contest_id.to_string())
            .await?;
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        let mut conn = self.conn();
        let mut found = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;
            found.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(found)
    }

    // --- session coherence -------------------------------------------------

    /// Point `active_session:{user_id}` at `session_id` for `ttl`.
    pub async fn set_active_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        ttl: Duration,
    ) -> Result<(), KvError> {
        let mut conn = self.conn();
        conn.set_ex::<_, _, ()>(
            keys::active_session(user_id),
            session_id.to_string(),
            ttl.as_secs(),
        )
        .await?;
        Ok(())
    }

    pub async fn active_session(&self, user_id: Uuid) -> Result<Option<String>, KvError> {
        let mut conn = self.conn();
        Ok(conn.get(keys::active_session(user_id)).await?)
    }

    pub async fn clear_active_session(&self, user_id: Uuid) -> Result<(), KvError> {
        let mut conn = self.conn();
        conn.del::<_, ()>(keys::active_session(user_id)).await?;
        Ok(())
    }

    /// Mark a displaced session so its next authorized call fails closed.
    pub async fn mark_force_logout(
        &self,
        session_id: Uuid,
        ttl: Duration,
    ) -> Result<(), KvError> {
        let mut conn = self.conn();
        conn.set_ex::<_, _, ()>(keys::force_logout(session_id), "true", ttl.as_secs())
            .await?;
        Ok(())
    }

    pub async fn clear_force_logout(&self, session_id: Uuid) -> Result<(), KvError> {
        let mut conn = self.conn();
        conn.del::<_, ()>(keys::force_logout(session_id)).await?;
        Ok(())
    }

    /// The authorizer's two session reads in one round-trip: whether the
    /// session is marked for forced logout, and which session is active for
    /// the user.
    pub async fn session_guard(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<(bool, Option<String>), KvError> {
        let mut conn = self.conn();
        let (force_logout, active): (i64, Option<String>) = redis::pipe()
            .cmd("EXISTS")
            .arg(keys::force_logout(session_id))
            .cmd("GET")
            .arg(keys::active_session(user_id))
            .query_async(&mut conn)
            .await?;
        Ok((force_logout > 0, active))
    }
}
