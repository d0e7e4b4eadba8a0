use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    family::FamilyError,
    goals::GoalError,
    insights::InsightError,
    journal::JournalError,
    profile::ProfileError,
    progress::ProgressError,
    routine::RoutineError,
    validation::FieldErrors,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

const QUOTE_FAILED: &str = "Failed to generate quote.";
const ANALYSIS_FAILED: &str = "Failed to analyze journal entries.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Routine(#[from] RoutineError),
    #[error(transparent)]
    Goal(#[from] GoalError),
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    Family(#[from] FamilyError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Insight(#[from] InsightError),
    #[error("missing user id")]
    Unauthorized,
}

enum Kind {
    Unauthorized,
    Invalid(FieldErrors),
    NotFound(&'static str),
    Generation(&'static str),
    Database,
}

impl ApiError {
    fn kind(self) -> Kind {
        match self {
            ApiError::Routine(RoutineError::Validation(e))
            | ApiError::Goal(GoalError::Validation(e))
            | ApiError::Journal(JournalError::Validation(e))
            | ApiError::Family(FamilyError::Validation(e)) => Kind::Invalid(e),
            ApiError::Routine(RoutineError::TaskNotFound) => Kind::NotFound("Routine task not found"),
            ApiError::Routine(RoutineError::RoutineNotFound) => Kind::NotFound("Routine not found"),
            ApiError::Goal(GoalError::NotFound) => Kind::NotFound("Goal not found"),
            ApiError::Family(FamilyError::TaskNotFound) => Kind::NotFound("Connection task not found"),
            ApiError::Family(FamilyError::EventNotFound) => Kind::NotFound("Family event not found"),
            ApiError::Profile(ProfileError::NotFound) => Kind::NotFound("Profile not found"),
            ApiError::Profile(ProfileError::Routine(e)) | ApiError::Progress(ProgressError::Routine(e)) => {
                ApiError::Routine(e).kind()
            }
            ApiError::Journal(JournalError::Insight(_)) => Kind::Generation(ANALYSIS_FAILED),
            ApiError::Insight(_) => Kind::Generation(QUOTE_FAILED),
            ApiError::Routine(RoutineError::Database(_))
            | ApiError::Goal(GoalError::Database(_))
            | ApiError::Journal(JournalError::Database(_))
            | ApiError::Family(FamilyError::Database(_))
            | ApiError::Profile(ProfileError::Database(_))
            | ApiError::Progress(ProgressError::Database(_)) => Kind::Database,
            ApiError::Unauthorized => Kind::Unauthorized,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        match self.kind() {
            Kind::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error("Sign in to continue.")),
            )
                .into_response(),
            Kind::Invalid(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<(), FieldErrors>::error_with_data(
                    "Please correct the highlighted fields.",
                    errors,
                )),
            )
                .into_response(),
            Kind::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ApiResponse::<()>::error(message))).into_response()
            }
            Kind::Generation(message) => {
                error!(error = %detail, "Text generation failed");
                (StatusCode::BAD_GATEWAY, Json(ApiResponse::<()>::error(message))).into_response()
            }
            Kind::Database => {
                error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::error("Something went wrong. Please try again.")),
                )
                    .into_response()
            }
        }
    }
}
