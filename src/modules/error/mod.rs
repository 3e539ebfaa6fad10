// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::raise_error;
use bb8::RunError;
use code::ErrorCode;
use poem::http::StatusCode;
use poem_openapi::{payload::Json, ApiResponse, Object};
use snafu::{Location, Snafu};

pub mod code;
pub mod handler;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ContactRelayError {
    #[snafu(display("{message}"))]
    Generic {
        message: String,
        #[snafu(implicit)]
        location: Location,
        code: ErrorCode,
    },
}

pub type ContactRelayResult<T, E = ContactRelayError> = std::result::Result<T, E>;

impl ContactRelayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ContactRelayError::Generic { code, .. } => *code,
        }
    }
}

impl From<RunError<ContactRelayError>> for ContactRelayError {
    fn from(e: RunError<ContactRelayError>) -> Self {
        match e {
            RunError::User(e) => e,
            RunError::TimedOut => raise_error!(
                "Timed out while attempting to acquire a connection from the pool".into(),
                ErrorCode::ConnectionPoolTimeout
            ),
        }
    }
}

/// JSON body of every error response: `{"error": "..."}`.
#[derive(Debug, Clone, Object)]
pub struct ApiError {
    pub error: String,
}

impl From<ContactRelayError> for ApiErrorResponse {
    fn from(error: ContactRelayError) -> Self {
        match error {
            ContactRelayError::Generic {
                message,
                location,
                code,
            } => {
                tracing::error!(
                    "API error occurred: [{:#?}] {} at {:?}",
                    code,
                    message,
                    location
                );
                ApiErrorResponse::Generic(code.status(), Json(ApiError::new(message)))
            }
        }
    }
}

impl ApiError {
    pub fn new(error: String) -> Self {
        Self { error }
    }
}

#[derive(Debug, Clone, ApiResponse)]
pub enum ApiErrorResponse {
    Generic(StatusCode, Json<ApiError>),
}
