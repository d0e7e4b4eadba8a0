use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::long_term_goal::UpsertLongTermGoal;
use services::services::goals::{GoalBoard, GoalWithUrgency};
use utils::{response::ApiResponse, time::today};
use uuid::Uuid;

use crate::{deployment::Deployment, error::ApiError, extract::CurrentUser};

/// GET /api/goals
pub async fn get_board(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<GoalBoard>>, ApiError> {
    let board = deployment.goals().board(&user_id, today()).await?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

/// POST /api/goals
pub async fn create_goal(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    axum::Json(payload): axum::Json<UpsertLongTermGoal>,
) -> Result<ResponseJson<ApiResponse<GoalWithUrgency>>, ApiError> {
    let goal = deployment.goals().create(&user_id, payload, today()).await?;
    Ok(ResponseJson(ApiResponse::success(goal)))
}

/// PUT /api/goals/{id}
pub async fn update_goal(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    Path(goal_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpsertLongTermGoal>,
) -> Result<ResponseJson<ApiResponse<GoalWithUrgency>>, ApiError> {
    let goal = deployment
        .goals()
        .update(&user_id, goal_id, payload, today())
        .await?;
    Ok(ResponseJson(ApiResponse::success(goal)))
}

/// DELETE /api/goals/{id}
pub async fn delete_goal(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    Path(goal_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.goals().delete(&user_id, goal_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/goals/{id}/toggle
pub async fn toggle_goal(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    Path(goal_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<GoalWithUrgency>>, ApiError> {
    let goal = deployment
        .goals()
        .toggle_completed(&user_id, goal_id, today())
        .await?;
    Ok(ResponseJson(ApiResponse::success(goal)))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/goals", get(get_board).post(create_goal))
        .route("/goals/{id}", put(update_goal).delete(delete_goal))
        .route("/goals/{id}/toggle", post(toggle_goal))
}
