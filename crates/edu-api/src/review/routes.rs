use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use edu_db::ScheduledTest;
use edu_srs::ScheduleRecommendation;
use uuid::Uuid;

use super::{
    CompletionOutcome, UpcomingReviews,
    model::{AttemptSubmission, CompletionSubmission, HistoryQuery, ScheduledAttemptResponse},
};
use crate::{ApiState, error::ApiError, validation};

/// Create the review routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/reviews/{learner_id}/recommendation",
            post(preview_recommendation),
        )
        .route("/reviews/{learner_id}/attempts", post(submit_attempt))
        .route("/reviews/{learner_id}/pending", get(list_pending))
        .route("/reviews/{learner_id}/upcoming", get(list_upcoming))
        .route("/reviews/{learner_id}/history", get(list_history))
        .route(
            "/reviews/{learner_id}/{test_id}",
            get(get_review).delete(cancel_review),
        )
        .route(
            "/reviews/{learner_id}/{test_id}/complete",
            post(complete_review),
        )
}

async fn preview_recommendation(
    State(state): State<ApiState>,
    Path(learner_id): Path<Uuid>,
    Json(payload): Json<AttemptSubmission>,
) -> Result<Json<ScheduleRecommendation>, ApiError> {
    payload.validate_all()?;

    let recommendation = state
        .reviews
        .preview(&payload.into_attempt(learner_id))
        .await;

    Ok(Json(recommendation))
}

/// Scheduling failures are not reported to the caller; the id is then null
async fn submit_attempt(
    State(state): State<ApiState>,
    Path(learner_id): Path<Uuid>,
    Json(payload): Json<AttemptSubmission>,
) -> Result<(StatusCode, Json<ScheduledAttemptResponse>), ApiError> {
    payload.validate_all()?;

    let scheduled_test_id = state
        .reviews
        .schedule_review_for_attempt(&payload.into_attempt(learner_id))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ScheduledAttemptResponse { scheduled_test_id }),
    ))
}

async fn list_pending(
    State(state): State<ApiState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<Vec<ScheduledTest>>, ApiError> {
    let pending = state.reviews.pending_reviews(learner_id).await?;
    Ok(Json(pending))
}

async fn list_upcoming(
    State(state): State<ApiState>,
    Path(learner_id): Path<Uuid>,
) -> Result<Json<UpcomingReviews>, ApiError> {
    let upcoming = state.reviews.categorize_upcoming(learner_id).await?;
    Ok(Json(upcoming))
}

async fn list_history(
    State(state): State<ApiState>,
    Path(learner_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ScheduledTest>>, ApiError> {
    let limit = validation::validate_history_limit(query.limit)?;
    let history = state.reviews.review_history(learner_id, limit).await?;
    Ok(Json(history))
}

async fn get_review(
    State(state): State<ApiState>,
    Path((learner_id, test_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ScheduledTest>, ApiError> {
    let test = state
        .reviews
        .get_scheduled_test(test_id, learner_id)
        .await?;
    Ok(Json(test))
}

async fn complete_review(
    State(state): State<ApiState>,
    Path((learner_id, test_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CompletionSubmission>,
) -> Result<Json<CompletionOutcome>, ApiError> {
    validation::validate_score(payload.final_score, "final_score")?;

    let outcome = state
        .reviews
        .on_scheduled_test_completed(test_id, learner_id, payload.final_score)
        .await?;

    Ok(Json(outcome))
}

async fn cancel_review(
    State(state): State<ApiState>,
    Path((learner_id, test_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .reviews
        .cancel_scheduled_test(test_id, learner_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
