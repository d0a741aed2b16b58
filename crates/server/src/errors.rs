use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::ModelError;
use serde::Serialize;
use service::auth::errors::AuthError;
use service::errors::{ServiceError, StoreError, StoreErrorKind};
use thiserror::Error;
use tracing::error;

/// Error response rendered as `{"message": ..., "detail": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, message: message.into(), detail }
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            Some(detail.to_string()),
        )
    }

    /// Map a service error, using `not_found` as the message for a missing record.
    pub fn from_service(e: ServiceError, not_found: &str) -> Self {
        match e {
            ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg))
            }
            ServiceError::Store(e) => Self::from_store(e, not_found),
        }
    }

    pub fn from_store(e: StoreError, not_found: &str) -> Self {
        match e.kind() {
            // a missing record is the client's problem; a missing collection file is ours
            StoreErrorKind::NotFound if e.is_record_not_found() => {
                Self::new(StatusCode::NOT_FOUND, not_found, None)
            }
            StoreErrorKind::DuplicateKey => {
                Self::new(StatusCode::CONFLICT, "Conflict", Some(e.to_string()))
            }
            _ => Self::internal(e),
        }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        Self::from_service(e, "Not Found")
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg))
            }
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "User already exists", None),
            AuthError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "Invalid email or password", None)
            }
            AuthError::Store(e) => Self::from_store(e, "Not Found"),
            other => {
                let code = other.code();
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    Some(format!("{other} (code {code})")),
                )
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "Invalid request body", Some(rejection.body_text()))
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), "Invalid path parameter", Some(rejection.body_text()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = %self.status,
                message = %self.message,
                detail = ?self.detail,
                "request failed"
            );
        }
        let body = ErrorBody { message: &self.message, detail: self.detail.as_deref() };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
