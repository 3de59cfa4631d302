use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

use crate::approvals::AlreadyApproved;
use crate::status::UnknownVariant;

pub type AppResult<T> = Result<T, AppError>;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Permission(String),
    #[error("version {version} does not exist for {entity} {id}")]
    InvalidVersion {
        entity: &'static str,
        id: uuid::Uuid,
        version: i32,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission(message.into())
    }
}

impl From<AlreadyApproved> for ServiceError {
    fn from(value: AlreadyApproved) -> Self {
        ServiceError::Conflict(value.to_string())
    }
}

impl From<UnknownVariant> for ServiceError {
    fn from(value: UnknownVariant) -> Self {
        ServiceError::Internal(format!("corrupt stored value: {value}"))
    }
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal<E: Display>(error: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        let status = match &value {
            ServiceError::Validation(_) | ServiceError::InvalidVersion { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Permission(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Database(diesel::result::Error::NotFound) => StatusCode::NOT_FOUND,
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                tracing::error!(error = %value, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError::new(status, value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_distinct_statuses() {
        let cases = [
            (ServiceError::validation("bad"), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("gone"), StatusCode::NOT_FOUND),
            (ServiceError::permission("no"), StatusCode::FORBIDDEN),
            (
                ServiceError::InvalidVersion {
                    entity: "tender",
                    id: uuid::Uuid::nil(),
                    version: 99,
                },
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                ServiceError::Database(diesel::result::Error::NotFound),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(AppError::from(error).status, expected);
        }
    }

    #[test]
    fn duplicate_approval_is_a_conflict() {
        let err = ServiceError::from(AlreadyApproved("alice".into()));
        assert!(matches!(err, ServiceError::Conflict(ref msg) if msg.contains("alice")));
    }

    #[test]
    fn invalid_version_message_names_the_target() {
        let err = ServiceError::InvalidVersion {
            entity: "bid",
            id: uuid::Uuid::nil(),
            version: 7,
        };
        let app = AppError::from(err);
        assert!(app.message.contains("version 7"));
        assert!(app.message.contains("bid"));
    }
}
