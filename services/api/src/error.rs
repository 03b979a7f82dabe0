//! Custom error types for the API service

use std::fmt::Display;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::response::{failure, no_data};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, mismatched or malformed input
    #[error("{message}")]
    Validation {
        message: String,
        missing_fields: Vec<&'static str>,
    },

    /// Duplicate unique field
    #[error("{0}")]
    Conflict(String),

    /// Unknown identifier or username
    #[error("{0}")]
    NotFound(String),

    /// Missing or bad credential
    #[error("{0}")]
    Unauthorized(String),

    /// Infrastructure failure; the message is the only detail sent to the client
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Validation error without a field list
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            missing_fields: Vec::new(),
        }
    }

    /// Validation error enumerating every missing field
    pub fn missing_fields(fields: Vec<&'static str>) -> Self {
        ApiError::Validation {
            message: format!("Missing required field(s): {}", fields.join(", ")),
            missing_fields: fields,
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log `err` and replace it with a generic internal error
    pub fn internal<E: Display>(message: &'static str) -> impl FnOnce(E) -> Self {
        move |err| {
            error!("{}: {}", message, err);
            ApiError::Internal(message)
        }
    }

    /// Map a store failure, turning check constraint violations into
    /// validation errors
    pub fn store(message: &'static str) -> impl FnOnce(DatabaseError) -> Self {
        move |err| match err {
            DatabaseError::CheckViolation { .. } => {
                ApiError::validation("Request violates a data constraint.")
            }
            other => ApiError::internal(message)(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Validation {
                message,
                missing_fields,
            } if !missing_fields.is_empty() => failure(
                status,
                message,
                json!({ "missingFields": missing_fields }),
            ),
            other => failure(status, other.to_string(), no_data()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
