//! Application error types and their HTTP responses.
//!
//! Credential failures all render as the same `401` body, whatever went wrong.
//! Storage and internal faults render as `500` and are logged here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::iam::{CredentialError, IamError};

pub const UNAUTHORIZED_BODY: &str = "unauthorized";
pub const INTERNAL_BODY: &str = "contact the operator";

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Iam(#[from] IamError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Iam(e) if e.is_credential_failure() => StatusCode::UNAUTHORIZED,
            AppError::Credential(CredentialError::NotFound | CredentialError::InvalidCredentials) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Iam(_) | AppError::Credential(_) | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::NOT_FOUND {
            return status.into_response();
        }

        let message = if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(error = %self, "unauthorized");
            UNAUTHORIZED_BODY.to_string()
        } else if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            INTERNAL_BODY.to_string()
        } else {
            match self {
                AppError::Validation(msg) | AppError::Conflict(msg) => msg,
                other => other.to_string(),
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
