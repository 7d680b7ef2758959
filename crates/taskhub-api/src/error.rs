//! API error type and response mapping

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use taskhub_core::DomainError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            // Uniform rejection: unknown user, wrong password, and inactive
            // account are indistinguishable to the client.
            DomainError::InvalidCredentials
            | DomainError::UserNotFound
            | DomainError::UserNotActive => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            DomainError::EmailAlreadyExists(_) => {
                ApiError::BadRequest("User with this email already exists".to_string())
            }
            DomainError::StoreUnavailable(msg)
            | DomainError::DatabaseError(msg)
            | DomainError::PasswordHashError(msg)
            | DomainError::TokenGenerationError(msg)
            | DomainError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, fields) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::debug!("unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "Unauthorized", msg, None)
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("forbidden: {}", msg);
                (StatusCode::FORBIDDEN, "Forbidden", msg, None)
            }
            ApiError::BadRequest(msg) => {
                tracing::debug!("bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BadRequest", msg, None)
            }
            ApiError::Validation(errors) => {
                let fields: HashMap<String, Vec<String>> = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errs)| {
                        let messages = errs
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            })
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect();
                tracing::debug!("validation failed: {:?}", fields);
                (
                    StatusCode::BAD_REQUEST,
                    "ValidationError",
                    "Request validation failed".to_string(),
                    Some(fields),
                )
            }
            ApiError::InternalError(msg) => {
                // Detail stays server-side; the client sees a generic message.
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            fields,
        });

        (status, body).into_response()
    }
}
