use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use drona_core::{ContestStatus, SubmissionBatch, SubmittedAnswer, UserRole};
use drona_store::{ContestUpdate, NewContest};
use uuid::Uuid;

use crate::schemas::{
    ContestResponse, ContestWithQuestionsResponse, CreateContestRequest, QuestionResponse,
    SubmitAccepted, SubmitRequest, UpdateContestRequest,
};
use crate::{ApiError, AppState, CurrentUser};

/// Admin-only contest creation with its question bag.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(authed): CurrentUser,
    Json(request): Json<CreateContestRequest>,
) -> Result<(StatusCode, Json<ContestResponse>), ApiError> {
    if authed.user.role != UserRole::Admin {
        return Err(ApiError::Forbidden);
    }
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("contest name must not be empty".into()));
    }
    if request.total_time <= 0 {
        return Err(ApiError::BadRequest("total_time must be positive".into()));
    }
    if request.ends_at <= request.starts_at {
        return Err(ApiError::BadRequest("ends_at must be after starts_at".into()));
    }
    let status = match &request.status {
        None => ContestStatus::NotStarted,
        Some(raw) => raw
            .parse::<ContestStatus>()
            .map_err(|err| ApiError::BadRequest(err.to_string()))?,
    };

    let contest = state
        .store
        .create_contest(&NewContest {
            name: request.name,
            description: request.description,
            total_time: request.total_time,
            status,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            question_ids: request.question_ids,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(contest.into())))
}

/// Admin-only partial update. Status may only move forward through the
/// contest lifecycle.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(authed): CurrentUser,
    Path(contest_id): Path<Uuid>,
    Json(request): Json<UpdateContestRequest>,
) -> Result<Json<ContestResponse>, ApiError> {
    if authed.user.role != UserRole::Admin {
        return Err(ApiError::Forbidden);
    }
    if matches!(request.total_time, Some(t) if t <= 0) {
        return Err(ApiError::BadRequest("total_time must be positive".into()));
    }
    let status = match &request.status {
        None => None,
        Some(raw) => Some(
            raw.parse::<ContestStatus>()
                .map_err(|err| ApiError::BadRequest(err.to_string()))?,
        ),
    };
    if let Some(next) = status {
        let current = state
            .store
            .contest_by_id(contest_id)
            .await?
            .ok_or(ApiError::NotFound("contest"))?
            .status;
        if next != current && !current.can_become(next) {
            return Err(ApiError::BadRequest(format!(
                "contest cannot move from {} to {}",
                current.as_str(),
                next.as_str()
            )));
        }
    }

    let contest = state
        .store
        .update_contest(
            contest_id,
            &ContestUpdate {
                total_time: request.total_time,
                status,
                starts_at: request.starts_at,
                ends_at: request.ends_at,
            },
        )
        .await?
        .ok_or(ApiError::NotFound("contest"))?;
    Ok(Json(contest.into()))
}

/// Contest with its hydrated (answer-key-free) question list.
pub async fn get_with_questions(
    State(state): State<AppState>,
    CurrentUser(_authed): CurrentUser,
    Path(contest_id): Path<Uuid>,
) -> Result<Json<ContestWithQuestionsResponse>, ApiError> {
    let contest = state
        .store
        .contest_by_id(contest_id)
        .await?
        .ok_or(ApiError::NotFound("contest"))?;
    let questions = state.store.contest_questions(contest_id).await?;

    Ok(Json(ContestWithQuestionsResponse {
        contest: contest.into(),
        questions: questions.into_iter().map(QuestionResponse::from).collect(),
    }))
}

/// Enqueue the caller's batch onto the contest's submission list.
///
/// 202 means "queued for evaluation", not "graded"; workers pick the batch
/// up asynchronously. Clients are expected to submit once per contest: a
/// later batch replaces the earlier one's leaderboard aggregate.
pub async fn submit(
    State(state): State<AppState>,
    CurrentUser(authed): CurrentUser,
    Path(contest_id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitAccepted>), ApiError> {
    if request.submissions.is_empty() {
        return Err(ApiError::BadRequest("submissions must not be empty".into()));
    }
    state
        .store
        .contest_by_id(contest_id)
        .await?
        .ok_or(ApiError::NotFound("contest"))?;

    let batch = SubmissionBatch {
        contest_id,
        user_id: authed.user.id,
        submissions: request
            .submissions
            .into_iter()
            .map(|item| SubmittedAnswer {
                question_id: item.question_id,
                user_answer: item.user_answer,
                time_taken: item.time_taken.max(0),
                hint_used: item.hint_used,
            })
            .collect(),
    };
    let queued = batch.submissions.len();
    state.kv.enqueue_batch(&batch).await?;

    tracing::info!(
        contest_id = %contest_id,
        user_id = %authed.user.id,
        submissions = queued,
        "queued submission batch"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitAccepted {
            status: "queued",
            contest_id,
            queued,
        }),
    ))
}
