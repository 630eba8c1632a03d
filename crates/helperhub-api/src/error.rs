//! HTTP error type and its `{"error": {"code", "message"}}` envelope.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use helperhub_db::DbError;
use helperhub_identity::{AuthError, ManagementError};
use helperhub_types::error::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body, path or query string could not be parsed.
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Identity(#[from] ManagementError),

    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ApiError::InvalidCredentials | ApiError::Auth(_) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            ApiError::Db(DbError::NotFound { .. }) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Db(DbError::Conflict { .. }) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Identity(_) => (StatusCode::BAD_GATEWAY, "IDENTITY_ERROR"),
            ApiError::Db(_) | ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            error!("{code}: {self}");
            match status {
                // Provider errors carry no local internals.
                StatusCode::BAD_GATEWAY => self.to_string(),
                _ => "internal server error".to_string(),
            }
        } else {
            warn!("Rejected request ({code}): {self}");
            self.to_string()
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let not_found = ApiError::from(DbError::not_found("volunteer", "a@b.com"));
        assert_eq!(not_found.status_and_code(), (StatusCode::NOT_FOUND, "NOT_FOUND"));

        let conflict = ApiError::from(DbError::Conflict {
            entity: "category",
            field: "category".into(),
        });
        assert_eq!(conflict.status_and_code(), (StatusCode::CONFLICT, "CONFLICT"));

        let poisoned = ApiError::from(DbError::LockPoisoned);
        assert_eq!(
            poisoned.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        );
    }

    #[test]
    fn auth_and_identity_errors() {
        assert_eq!(
            ApiError::from(AuthError::Expired).status_and_code().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(ManagementError::Disabled).status_and_code(),
            (StatusCode::BAD_GATEWAY, "IDENTITY_ERROR")
        );
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
