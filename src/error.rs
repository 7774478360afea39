use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Authentication failed")]
    AuthError,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub(crate) fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found"))
    }
}

/// Maps constraint violations onto client-facing statuses; anything else is a server fault.
fn classify_database_error(e: &sqlx::Error) -> (StatusCode, String) {
    let Some(db_err) = e.as_database_error() else {
        if matches!(e, sqlx::Error::RowNotFound) {
            return (StatusCode::NOT_FOUND, "Not found".to_string());
        }
        tracing::error!(error = %e, "Database error");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string());
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.kind() {
        ErrorKind::UniqueViolation => {
            tracing::debug!(constraint, "Unique constraint violated");
            (StatusCode::CONFLICT, format!("Unique constraint failed: {constraint}"))
        }
        ErrorKind::ForeignKeyViolation => {
            tracing::debug!(constraint, "Foreign key constraint violated");
            (StatusCode::CONFLICT, format!("Foreign key constraint failed: {constraint}"))
        }
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
            tracing::debug!(constraint, "Check constraint violated");
            (StatusCode::BAD_REQUEST, format!("Constraint failed: {constraint}"))
        }
        _ => {
            tracing::error!(error = %e, "Database error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Database(e) => classify_database_error(&e),
            Self::AuthError => {
                tracing::debug!("Authentication failed");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            Self::NotFound(msg) => {
                tracing::debug!(message = %msg, "Resource not found");
                (StatusCode::NOT_FOUND, msg)
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Conflict(msg) => {
                tracing::debug!(message = %msg, "Conflict");
                (StatusCode::CONFLICT, msg)
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_entity_name() {
        let response = AppError::not_found("Airport").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let (status, _) = classify_database_error(&sqlx::Error::RowNotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_pool_errors_are_internal() {
        let (status, message) = classify_database_error(&sqlx::Error::PoolTimedOut);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }
}
