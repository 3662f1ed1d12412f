//! The contest pipeline's worker loops.
//!
//! Submission workers drain per-contest queues, grade batches and maintain
//! leaderboard rows; the grading worker waits for full quiescence and then
//! recomputes ranks and ratings. Both are plain loops over `drona-kv` and
//! `drona-store` handles, cancelled cooperatively at batch boundaries.

mod grading;
mod quiet;
mod submission;

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use grading::GradingWorker;
pub use quiet::QuietWindow;
pub use submission::SubmissionWorker;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Kv(#[from] drona_kv::KvError),

    #[error(transparent)]
    Store(#[from] drona_store::StoreError),
}

/// Sleep that returns early when shutdown is requested.
pub(crate) async fn sleep_or_shutdown(shutdown: &CancellationToken, duration: Duration) {
    tokio::select! {
        _ = shutdown.cancelled() => {}
        _ = tokio::time::sleep(duration) => {}
    }
}
