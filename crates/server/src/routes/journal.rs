use axum::{Router, extract::State, response::Json as ResponseJson, routing::{get, post}};
use db::models::journal_entry::{CreateJournalEntry, JournalEntry};
use serde::Serialize;
use ts_rs::TS;
use utils::{response::ApiResponse, time::today};

use crate::{deployment::Deployment, error::ApiError, extract::CurrentUser};

#[derive(Debug, Serialize, TS)]
pub struct JournalAnalysis {
    pub summary: String,
}

/// GET /api/journal
/// Newest entries first.
pub async fn list_entries(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<JournalEntry>>>, ApiError> {
    let entries = deployment.journal().list(&user_id).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

/// POST /api/journal
pub async fn create_entry(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    axum::Json(payload): axum::Json<CreateJournalEntry>,
) -> Result<ResponseJson<ApiResponse<JournalEntry>>, ApiError> {
    let entry = deployment
        .journal()
        .create(&user_id, today(), payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

/// POST /api/journal/analysis
pub async fn analyze(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<JournalAnalysis>>, ApiError> {
    let summary = deployment.journal().analyze(&user_id).await?;
    Ok(ResponseJson(ApiResponse::success(JournalAnalysis { summary })))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/journal", get(list_entries).post(create_entry))
        .route("/journal/analysis", post(analyze))
}
