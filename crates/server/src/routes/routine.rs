use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, get, post, put},
};
use db::models::routine_task::{CreateRoutineTask, RoutineTask};
use services::services::routine::{PlanningNote, RoutineDay, UpdateFocusGoal};
use utils::{response::ApiResponse, time::today};
use uuid::Uuid;

use crate::{deployment::Deployment, error::ApiError, extract::CurrentUser};

/// GET /api/routine/today
pub async fn get_today(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<RoutineDay>>, ApiError> {
    let day = deployment.routine().day(&user_id, today()).await?;
    Ok(ResponseJson(ApiResponse::success(day)))
}

/// GET /api/routine/tasks
pub async fn list_tasks(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<RoutineTask>>>, ApiError> {
    let tasks = deployment.routine().list_tasks(&user_id).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

/// POST /api/routine/tasks
pub async fn create_task(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    axum::Json(payload): axum::Json<CreateRoutineTask>,
) -> Result<ResponseJson<ApiResponse<RoutineTask>>, ApiError> {
    let task = deployment.routine().create_task(&user_id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// DELETE /api/routine/tasks/{id}
pub async fn delete_task(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.routine().delete_task(&user_id, task_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/routine/today/tasks/{id}/toggle
pub async fn toggle_task(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<RoutineDay>>, ApiError> {
    let day = deployment
        .routine()
        .toggle_task(&user_id, today(), task_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(day)))
}

/// PUT /api/routine/today/goals/{slot}
pub async fn update_goal(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    Path(slot): Path<usize>,
    axum::Json(payload): axum::Json<UpdateFocusGoal>,
) -> Result<ResponseJson<ApiResponse<RoutineDay>>, ApiError> {
    let day = deployment
        .routine()
        .update_goal(&user_id, today(), slot, payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(day)))
}

/// PUT /api/routine/today/notes
/// Accepted immediately; the write lands after the quiet period.
pub async fn queue_note(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    axum::Json(payload): axum::Json<PlanningNote>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment
        .routine()
        .queue_planning_note(&user_id, today(), payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new().nest(
        "/routine",
        Router::new()
            .route("/today", get(get_today))
            .route("/tasks", get(list_tasks).post(create_task))
            .route("/tasks/{id}", delete(delete_task))
            .route("/today/tasks/{id}/toggle", post(toggle_task))
            .route("/today/goals/{slot}", put(update_goal))
            .route("/today/notes", put(queue_note)),
    )
}
