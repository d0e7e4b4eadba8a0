use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use services::services::progress::{Achievement, Dashboard, MonthlyDiscipline};
use utils::{response::ApiResponse, time::today};

use crate::{deployment::Deployment, error::ApiError, extract::CurrentUser};

const DEFAULT_MONTHS: u32 = 6;

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub months: Option<u32>,
}

/// GET /api/progress/monthly?months=N
pub async fn monthly(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<MonthlyQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<MonthlyDiscipline>>>, ApiError> {
    let months = deployment
        .progress()
        .monthly(&user_id, query.months.unwrap_or(DEFAULT_MONTHS), today())
        .await?;
    Ok(ResponseJson(ApiResponse::success(months)))
}

/// GET /api/progress/dashboard
pub async fn dashboard(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Dashboard>>, ApiError> {
    let dashboard = deployment.progress().dashboard(&user_id, today()).await?;
    Ok(ResponseJson(ApiResponse::success(dashboard)))
}

/// GET /api/progress/achievements
pub async fn achievements(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<Achievement>>>, ApiError> {
    let achievements = deployment.progress().achievements(&user_id, today()).await?;
    Ok(ResponseJson(ApiResponse::success(achievements)))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new()
        .route("/progress/monthly", get(monthly))
        .route("/progress/dashboard", get(dashboard))
        .route("/progress/achievements", get(achievements))
}
