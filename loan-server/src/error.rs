use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use loan_core::RepositoryError;
use loan_core::report::RenderError;
use loan_core::wizard::{ErrorMap, WizardError};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Errors returned by the HTTP handlers.
///
/// Rendered as `{"error": "..."}`, except validation failures which carry
/// the field map as `{"errors": {...}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("form is invalid")]
    Validation(ErrorMap),

    #[error("report {0} not found")]
    ReportNotFound(i64),

    #[error("wizard session {0} not found")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ApiError {
    /// Maps a repository lookup failure, naming the report on `NotFound`.
    pub fn for_report(id: i64) -> impl FnOnce(RepositoryError) -> Self {
        move |err| match err {
            RepositoryError::NotFound => Self::ReportNotFound(id),
            other => Self::Repository(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ReportNotFound(_) | Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::Wizard(WizardError::StepOutOfRange(_)) => StatusCode::BAD_REQUEST,
            Self::Wizard(_) => StatusCode::CONFLICT,
            Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Repository(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = match self {
            Self::Validation(errors) => json!({ "errors": errors }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(
            ApiError::Validation(ErrorMap::new()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::ReportNotFound(7).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(WizardError::SubmissionInFlight).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(WizardError::StepOutOfRange(12)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RepositoryError::Database("locked".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_names_the_report() {
        let err = ApiError::for_report(42)(RepositoryError::NotFound);

        assert_eq!(err.to_string(), "report 42 not found");
    }

    #[test]
    fn other_repository_errors_pass_through() {
        let err = ApiError::for_report(42)(RepositoryError::Connection("gone".to_string()));

        assert!(matches!(err, ApiError::Repository(RepositoryError::Connection(_))));
    }
}
