use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header set by the identity-provider gateway with the signed-in user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The signed-in user. Requests without a user id are rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| CurrentUser(value.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}
