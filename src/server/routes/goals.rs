//! Goal endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderName, StatusCode},
    Json,
};

use crate::server::session::SessionId;
use crate::server::state::AppState;
use crate::server::types::{
    validate_goal_text, CreateGoalRequest, DeleteGoalResponse, ErrorResponse, GoalResponse,
    ListGoalsQuery,
};

type ApiError = (StatusCode, Json<ErrorResponse>);
type SetCookie = [(HeaderName, String); 1];

fn api_error(status: StatusCode, code: &str, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
            code: code.to_string(),
        }),
    )
}

fn goal_not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "GOAL_NOT_FOUND", "Goal not found")
}

fn set_cookie(state: &AppState, session: &SessionId) -> SetCookie {
    [(header::SET_COOKIE, session.cookie(state.secure_cookies()))]
}

/// POST /api/goals - Break down a goal and save it
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    payload: Result<Json<CreateGoalRequest>, JsonRejection>,
) -> Result<(StatusCode, SetCookie, Json<GoalResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_REQUEST",
            rejection.body_text(),
        )
    })?;

    validate_goal_text(&request.goal_text)
        .map_err(|detail| api_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_GOAL_TEXT", detail))?;

    let breakdown = state.decomposer.decompose(&request.goal_text).await;
    if breakdown.is_fallback() {
        tracing::info!("Saving goal with fallback breakdown");
    }

    let goal = state
        .store
        .create_goal(&session.id, &request.goal_text, &breakdown)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save goal: {:#}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "GOAL_CREATE_FAILED",
                format!("Error creating goal: {}", e),
            )
        })?;

    tracing::info!(
        goal_id = goal.id,
        complexity = goal.complexity_score,
        "Created goal"
    );

    Ok((
        StatusCode::CREATED,
        set_cookie(&state, &session),
        Json(GoalResponse::from(goal)),
    ))
}

/// GET /api/goals - List the caller's goals, newest first
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Query(query): Query<ListGoalsQuery>,
) -> Result<(SetCookie, Json<Vec<GoalResponse>>), ApiError> {
    let (skip, limit) = query.bounds();

    let goals = state
        .store
        .list_goals(&session.id, skip, limit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list goals: {:#}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "GOAL_LIST_FAILED",
                format!("Error listing goals: {}", e),
            )
        })?;

    Ok((
        set_cookie(&state, &session),
        Json(goals.into_iter().map(GoalResponse::from).collect()),
    ))
}

/// GET /api/goals/:id - Get one of the caller's goals
pub async fn get_goal(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(goal_id): Path<i64>,
) -> Result<Json<GoalResponse>, ApiError> {
    let goal = state
        .store
        .get_goal(&session.id, goal_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load goal {}: {:#}", goal_id, e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "GOAL_LOAD_FAILED",
                format!("Error loading goal: {}", e),
            )
        })?
        .ok_or_else(goal_not_found)?;

    Ok(Json(GoalResponse::from(goal)))
}

/// DELETE /api/goals/:id - Delete one of the caller's goals and its tasks
pub async fn delete_goal(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(goal_id): Path<i64>,
) -> Result<Json<DeleteGoalResponse>, ApiError> {
    let deleted = state
        .store
        .delete_goal(&session.id, goal_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete goal {}: {:#}", goal_id, e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "GOAL_DELETE_FAILED",
                format!("Error deleting goal: {}", e),
            )
        })?;

    if !deleted {
        return Err(goal_not_found());
    }

    tracing::info!(goal_id, "Deleted goal");

    Ok(Json(DeleteGoalResponse {
        message: "Goal deleted successfully".to_string(),
    }))
}
