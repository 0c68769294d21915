//! User-related error types

use actix_web::http::StatusCode;
use thiserror::Error;

/// Errors reported by a `UserService`
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Email already in use")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UserError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::EmailTaken => StatusCode::CONFLICT,
            UserError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            UserError::Validation(_) => StatusCode::BAD_REQUEST,
            UserError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_key(&self) -> &'static str {
        match self {
            UserError::NotFound => "USER_NOT_FOUND",
            UserError::EmailTaken => "EMAIL_TAKEN",
            UserError::InvalidCredentials => "INVALID_CREDENTIALS",
            UserError::Validation(_) => "VALIDATION_ERROR",
            UserError::Token(_) => "TOKEN_ERROR",
            UserError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
