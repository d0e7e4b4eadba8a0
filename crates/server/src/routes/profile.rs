use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::user::{UpsertUserProfile, UserProfile};
use utils::response::ApiResponse;

use crate::{deployment::Deployment, error::ApiError, extract::CurrentUser};

/// PUT /api/profile
/// Records a sign-in; the first one also seeds the default routine.
pub async fn sign_in(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
    axum::Json(payload): axum::Json<UpsertUserProfile>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, ApiError> {
    let profile = deployment.profile().sign_in(&user_id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

/// GET /api/profile
pub async fn get_profile(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, ApiError> {
    let profile = deployment.profile().get(&user_id).await?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new().route("/profile", get(get_profile).put(sign_in))
}
