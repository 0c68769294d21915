//! Type definitions for user_endpoint
//!
//! Contains the shared error types, the JSON envelopes and configuration models
//! used throughout the app.

use crate::user::error::UserError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application startup errors
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Server binding error: {0}")]
    ServerBind(String),
}

/// How service errors are translated into HTTP status codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusMapping {
    /// Each `UserError` kind keeps its own status (404, 409, 500...)
    #[default]
    Typed,
    /// Every service error is reported as 400 Bad Request
    Legacy,
}

/// Complete app configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bind_address: String,
    pub api_prefix: String,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub cors_origins: Vec<String>,
    pub status_mapping: StatusMapping,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            api_prefix: "/api/v1".to_string(),
            jwt_secret: "change_me_in_production".to_string(),
            token_ttl_seconds: 3600,
            cors_origins: vec!["*".to_string()],
            status_mapping: StatusMapping::Typed,
        }
    }
}

/// Uniform success envelope: `{"data": ...}`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
        }
    }
}

/// Standard error envelope
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub log: String,
    pub error_key: String,
}

/// Runtime API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, failed validation or an unparseable path identifier
    #[error("invalid request")]
    InvalidRequest(String),

    #[error("unauthorized")]
    Unauthorized(String),

    /// Failure reported by the user service, with the status it maps to
    #[error("{source}")]
    Service {
        source: UserError,
        status: StatusCode,
    },
}

impl ApiError {
    pub fn invalid_request(err: impl ToString) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }

    pub fn service(source: UserError, mapping: StatusMapping) -> Self {
        let status = match mapping {
            StatusMapping::Typed => source.status_code(),
            StatusMapping::Legacy => StatusCode::BAD_REQUEST,
        };
        ApiError::Service {
            source,
            status,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let status_code = self.status_code().as_u16();
        match self {
            ApiError::InvalidRequest(log) => ErrorResponse {
                status_code,
                message: self.to_string(),
                log: log.clone(),
                error_key: "ErrInvalidRequest".to_string(),
            },
            ApiError::Unauthorized(log) => ErrorResponse {
                status_code,
                message: self.to_string(),
                log: log.clone(),
                error_key: "UNAUTHORIZED".to_string(),
            },
            ApiError::Service {
                source,
                ..
            } => ErrorResponse {
                status_code,
                message: source.to_string(),
                log: source.to_string(),
                error_key: source.error_key().to_string(),
            },
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Service {
                status,
                ..
            } => *status,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_response())
    }
}
