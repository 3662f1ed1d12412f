use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use drona_engine::{competition_ranks, update_ratings, Participant};
use drona_kv::{keys, Kv};
use drona_store::{leaderboard, users, Store};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{sleep_or_shutdown, QuietWindow, WorkerError};

/// Recomputes ranks and ratings once the submission queues quiesce.
///
/// Runs as a single instance (duplicates are harmless: grading is a pure
/// function of the committed rows, so a re-run writes the same values). The
/// advisory `contest:grading` list is telemetry; correctness comes from the
/// empty-threshold rule alone.
pub struct GradingWorker {
    worker_id: String,
    kv: Kv,
    store: Store,
    check_interval: Duration,
    empty_threshold: Duration,
    window: QuietWindow,
    /// Contests already graded in the current quiet window.
    graded: HashSet<Uuid>,
}

impl GradingWorker {
    pub fn new(
        worker_id: String,
        kv: Kv,
        store: Store,
        check_interval: Duration,
        empty_threshold: Duration,
    ) -> GradingWorker {
        GradingWorker {
            worker_id,
            kv,
            store,
            check_interval,
            empty_threshold,
            window: QuietWindow::new(),
            graded: HashSet::new(),
        }
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(worker_id = %self.worker_id, "grading worker started");
        while !shutdown.is_cancelled() {
            if let Err(err) = self.tick().await {
                tracing::error!(
                    worker_id = %self.worker_id,
                    error = %err,
                    "error in grading worker loop"
                );
            }
            sleep_or_shutdown(&shutdown, self.check_interval).await;
        }
        tracing::info!(worker_id = %self.worker_id, "grading worker stopped");
    }

    async fn tick(&mut self) -> Result<(), WorkerError> {
        let active = self.kv.active_submission_queues().await?;

        if !active.is_empty() {
            // Submissions are flowing again: restart the dwell clock and let
            // the affected contests be re-graded on the next quiet window.
            self.window.reset();
            for queue in &active {
                if let Some(contest_id) = keys::contest_id_from_queue(queue) {
                    self.graded.remove(&contest_id);
                }
            }
            return Ok(());
        }

        let quiet_for = self.window.observe_empty(Instant::now());
        if quiet_for < self.empty_threshold {
            tracing::debug!(
                worker_id = %self.worker_id,
                quiet_secs = quiet_for.as_secs(),
                needed_secs = self.empty_threshold.as_secs(),
                "queues quiet, waiting for the dwell threshold"
            );
            return Ok(());
        }

        // Empty queues keep their keys, so the scan still names every
        // contest that ever received submissions.
        let contest_ids: HashSet<Uuid> = self
            .kv
            .submission_queues()
            .await?
            .iter()
            .filter_map(|queue| keys::contest_id_from_queue(queue))
            .collect();
        let ungraded: Vec<Uuid> = contest_ids
            .into_iter()
            .filter(|contest_id| !self.graded.contains(contest_id))
            .collect();
        if ungraded.is_empty() {
            return Ok(());
        }

        tracing::info!(
            worker_id = %self.worker_id,
            quiet_secs = quiet_for.as_secs(),
            contests = ungraded.len(),
            "queues quiet past threshold, grading contests"
        );
        for contest_id in ungraded {
            match grade_contest(&self.store, contest_id).await {
                Ok(graded_rows) => {
                    tracing::info!(
                        worker_id = %self.worker_id,
                        contest_id = %contest_id,
                        participants = graded_rows,
                        "contest graded"
                    );
                    self.graded.insert(contest_id);
                }
                Err(err) => {
                    // Left out of the graded set: retried on the next window.
                    tracing::error!(
                        worker_id = %self.worker_id,
                        contest_id = %contest_id,
                        error = %err,
                        "failed to grade contest"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Assign ranks and apply the rating update for one contest, all in a single
/// transaction. Returns the number of participants graded.
pub async fn grade_contest(store: &Store, contest_id: Uuid) -> Result<usize, WorkerError> {
    let mut tx = store.begin().await?;

    let rows = leaderboard::rows_by_score_desc(&mut tx, contest_id).await?;
    if rows.is_empty() {
        return Ok(0);
    }

    let scores: Vec<i32> = rows.iter().map(|row| row.score).collect();
    let ranks = competition_ranks(&scores);
    for (row, &rank) in rows.iter().zip(&ranks) {
        leaderboard::set_rank(&mut tx, row.id, rank).await?;
    }

    let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
    let standings: HashMap<Uuid, users::RatingStanding> =
        users::rating_standings(&mut tx, &user_ids)
            .await?
            .into_iter()
            .map(|standing| (standing.user_id, standing))
            .collect();

    let mut participants = Vec::with_capacity(rows.len());
    let mut row_ids = HashMap::with_capacity(rows.len());
    for (row, &rank) in rows.iter().zip(&ranks) {
        let Some(standing) = standings.get(&row.user_id) else {
            tracing::warn!(user_id = %row.user_id, "leaderboard row without a user, skipping");
            continue;
        };
        let contests_played =
            leaderboard::contests_played(&mut tx, row.user_id, contest_id).await?;
        participants.push(Participant {
            user_id: row.user_id,
            rating: standing.current_rating,
            rank,
            contests_played,
        });
        row_ids.insert(row.user_id, row.id);
    }

    if participants.is_empty() {
        tx.commit().await.map_err(drona_store::StoreError::from)?;
        return Ok(0);
    }

    let changes = update_ratings(&participants);
    for change in &changes {
        leaderboard::apply_rating(
            &mut tx,
            row_ids[&change.user_id],
            change.rating_before,
            change.rating_after,
            change.delta,
        )
        .await?;
        let standing = &standings[&change.user_id];
        users::set_rating(
            &mut tx,
            change.user_id,
            change.rating_after,
            standing.max_rating.max(change.rating_after),
        )
        .await?;
    }

    let graded = changes.len();
    tx.commit().await.map_err(drona_store::StoreError::from)?;
    Ok(graded)
}
