use std::collections::HashSet;
use std::time::Duration;

use drona_core::SubmissionBatch;
use drona_engine::{evaluate, BatchTotals};
use drona_kv::{keys, Kv};
use drona_store::{attempts, contests, leaderboard, questions, users};
use drona_store::{LeaderboardUpsert, NewAttempt, Store};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{sleep_or_shutdown, WorkerError};

/// One member of the stateless submission worker pool.
///
/// Per iteration: discover non-empty contest queues, announce queues that
/// drained since the last look, pop at most one batch via the atomic blocking
/// pop, and process it to a committed transaction before asking for more.
pub struct SubmissionWorker {
    worker_id: String,
    kv: Kv,
    store: Store,
    poll_interval: Duration,
    blocking_timeout: Duration,
    /// Queues observed non-empty before; leaving this set means the queue
    /// drained and its contest id gets announced exactly once.
    seen_queues: HashSet<String>,
}

impl SubmissionWorker {
    pub fn new(
        worker_id: String,
        kv: Kv,
        store: Store,
        poll_interval: Duration,
        blocking_timeout: Duration,
    ) -> SubmissionWorker {
        SubmissionWorker {
            worker_id,
            kv,
            store,
            poll_interval,
            blocking_timeout,
            seen_queues: HashSet::new(),
        }
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(worker_id = %self.worker_id, "submission worker started");
        while !shutdown.is_cancelled() {
            if let Err(err) = self.tick(&shutdown).await {
                tracing::error!(
                    worker_id = %self.worker_id,
                    error = %err,
                    "error in submission worker loop"
                );
                sleep_or_shutdown(&shutdown, self.poll_interval * 5).await;
            }
        }
        tracing::info!(worker_id = %self.worker_id, "submission worker stopped");
    }

    async fn tick(&mut self, shutdown: &CancellationToken) -> Result<(), WorkerError> {
        let active = self.kv.active_submission_queues().await?;
        let current: HashSet<String> = active.iter().cloned().collect();

        self.announce_drained_queues(&current).await;
        self.seen_queues.extend(current);

        if active.is_empty() {
            sleep_or_shutdown(shutdown, self.poll_interval * 5).await;
            return Ok(());
        }

        // Round-robin: take one batch, then rediscover so other contests get
        // a turn on the next outer iteration.
        let mut processed_any = false;
        for queue in &active {
            if shutdown.is_cancelled() {
                break;
            }
            let batch = match self.kv.pop_batch(queue, self.blocking_timeout).await {
                Ok(Some(batch)) => batch,
                Ok(None) => continue,
                Err(err) => {
                    tracing::error!(queue = %queue, error = %err, "failed to pop from queue");
                    continue;
                }
            };
            processed_any = true;
            if let Err(err) = self.process_batch(&batch).await {
                // The batch is not requeued: delivery is at-most-once and
                // re-submission is the client's responsibility.
                tracing::error!(
                    worker_id = %self.worker_id,
                    queue = %queue,
                    user_id = %batch.user_id,
                    error = %err,
                    "failed to process submission batch"
                );
            }
            break;
        }

        if !processed_any {
            sleep_or_shutdown(shutdown, self.poll_interval).await;
        }
        Ok(())
    }

    /// Idle handoff: push the contest id of every queue that went from
    /// non-empty to empty onto the advisory grading list.
    async fn announce_drained_queues(&mut self, current: &HashSet<String>) {
        let drained: Vec<String> = self
            .seen_queues
            .iter()
            .filter(|queue| !current.contains(*queue))
            .cloned()
            .collect();

        for queue in drained {
            match keys::contest_id_from_queue(&queue) {
                Some(contest_id) => match self.kv.announce_drained(contest_id).await {
                    Ok(()) => {
                        tracing::info!(
                            worker_id = %self.worker_id,
                            contest_id = %contest_id,
                            "contest queue drained, announced for grading"
                        );
                        self.seen_queues.remove(&queue);
                    }
                    Err(err) => {
                        // Keep the queue in the seen set; the announcement is
                        // retried on the next iteration.
                        tracing::warn!(queue = %queue, error = %err, "failed to announce drained queue");
                    }
                },
                None => {
                    tracing::warn!(queue = %queue, "queue name does not embed a contest id");
                    self.seen_queues.remove(&queue);
                }
            }
        }
    }

    /// Grade one user-batch inside a single transaction: attempts in input
    /// order, the leaderboard upsert last, one commit publishing both.
    async fn process_batch(&self, batch: &SubmissionBatch) -> Result<(), WorkerError> {
        let mut tx = self.store.begin().await?;

        let Some(contest) = contests::fetch(&mut tx, batch.contest_id).await? else {
            tracing::error!(
                worker_id = %self.worker_id,
                contest_id = %batch.contest_id,
                "abandoning batch: contest not found"
            );
            return Ok(());
        };
        let Some(user) = users::fetch(&mut tx, batch.user_id).await? else {
            tracing::error!(
                worker_id = %self.worker_id,
                user_id = %batch.user_id,
                "abandoning batch: user not found"
            );
            return Ok(());
        };

        let total_questions = contests::question_count(&mut tx, contest.id).await? as i32;

        let question_ids: Vec<Uuid> = batch
            .submissions
            .iter()
            .map(|submission| submission.question_id)
            .collect();
        let question_index = questions::gradable_by_ids(&mut tx, &question_ids).await?;

        let mut totals = BatchTotals::default();
        let mut failed: u32 = 0;

        for submission in &batch.submissions {
            let Some(question) = question_index.get(&submission.question_id) else {
                tracing::warn!(
                    worker_id = %self.worker_id,
                    question_id = %submission.question_id,
                    "question not found, skipping submission"
                );
                failed += 1;
                continue;
            };

            let verdict = evaluate(question, &submission.user_answer);
            attempts::insert(
                &mut tx,
                &NewAttempt {
                    user_id: user.id,
                    question_id: question.id,
                    user_answer: submission.user_answer.clone(),
                    is_correct: verdict.is_correct,
                    marks_obtained: verdict.marks,
                    time_taken: submission.time_taken,
                    hint_used: submission.hint_used,
                },
            )
            .await?;
            totals.record(verdict, submission.time_taken);
        }

        if totals.attempted > 0 {
            leaderboard::upsert(
                &mut tx,
                &LeaderboardUpsert {
                    user_id: user.id,
                    contest_id: contest.id,
                    score: totals.score,
                    accuracy: totals.accuracy(),
                    total_questions,
                    attempted: totals.attempted,
                    unattempted: totals.unattempted(total_questions),
                    correct: totals.correct,
                    incorrect: totals.incorrect,
                    total_time: totals.total_time,
                    rating_before: user.current_rating,
                },
            )
            .await?;
            tx.commit().await.map_err(drona_store::StoreError::from)?;
        }

        tracing::info!(
            worker_id = %self.worker_id,
            user_id = %user.id,
            contest_id = %contest.id,
            processed = totals.attempted,
            failed,
            score = totals.score,
            "processed user submission batch"
        );
        Ok(())
    }
}
