use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{deployment::Deployment, error::ApiError, extract::CurrentUser};

#[derive(Debug, Serialize, TS)]
pub struct Quote {
    pub text: String,
}

/// GET /api/insights/quote
pub async fn get_quote(
    State(deployment): State<Deployment>,
    CurrentUser(_user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Quote>>, ApiError> {
    let text = deployment.insights().motivational_quote().await?;
    Ok(ResponseJson(ApiResponse::success(Quote { text })))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new().route("/insights/quote", get(get_quote))
}
