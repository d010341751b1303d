use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campus_assistant::AssistantError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Course not found.")]
    CourseNotFound,
    #[error("No courses found matching that keyword.")]
    NoMatchingCourses,
    #[error("No sessions found for this email.")]
    NoSessionsForEmail,
    #[error("rate limit exceeded for this client")]
    RateLimited,
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::CourseNotFound | Self::NoMatchingCourses | Self::NoSessionsForEmail => {
                StatusCode::NOT_FOUND
            }
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::CourseNotFound => "course_not_found",
            Self::NoMatchingCourses => "no_matching_courses",
            Self::NoSessionsForEmail => "no_sessions_found",
            Self::RateLimited => "rate_limited",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(error: AssistantError) -> Self {
        match error {
            AssistantError::CourseNotFound(_) => Self::CourseNotFound,
            AssistantError::NoMatchingCourses(_) => Self::NoMatchingCourses,
            AssistantError::NoSessionsForEmail(_) => Self::NoSessionsForEmail,
            AssistantError::Storage(source) => Self::Internal(source),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            tracing::error!(error = ?source, "request failed");
        }

        (
            self.status(),
            Json(serde_json::json!({
                "error": self.code(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
