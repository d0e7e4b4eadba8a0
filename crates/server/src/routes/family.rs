use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::{
    connection_task::ConnectionTask,
    family_event::{FamilyEvent, UpsertFamilyEvent},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{deployment::Deployment, error::ApiError, extract::CurrentUser};

/// GET /api/family/tasks
/// The first call seeds the default checklist.
pub async fn list_tasks(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<ConnectionTask>>>, ApiError> {
    let tasks = deployment.family().connection_tasks(&user_id).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

/// POST /api/family/tasks/{id}/toggle
pub async fn toggle_task(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ConnectionTask>>, ApiError> {
    let task = deployment
        .family()
        .toggle_connection_task(&user_id, task_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// GET /api/family/events
pub async fn list_events(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<FamilyEvent>>>, ApiError> {
    let events = deployment.family().list_events(&user_id).await?;
    Ok(ResponseJson(ApiResponse::success(events)))
}

/// POST /api/family/events
pub async fn create_event(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    axum::Json(payload): axum::Json<UpsertFamilyEvent>,
) -> Result<ResponseJson<ApiResponse<FamilyEvent>>, ApiError> {
    let event = deployment.family().create_event(&user_id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

/// PUT /api/family/events/{id}
pub async fn update_event(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    Path(event_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpsertFamilyEvent>,
) -> Result<ResponseJson<ApiResponse<FamilyEvent>>, ApiError> {
    let event = deployment
        .family()
        .update_event(&user_id, event_id, payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

/// GET /api/family/events/latest
pub async fn latest_event(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Option<FamilyEvent>>>, ApiError> {
    let event = deployment.family().latest_event(&user_id).await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new().nest(
        "/family",
        Router::new()
            .route("/tasks", get(list_tasks))
            .route("/tasks/{id}/toggle", post(toggle_task))
            .route("/events", get(list_events).post(create_event))
            .route("/events/latest", get(latest_event))
            .route("/events/{id}", put(update_event)),
    )
}
