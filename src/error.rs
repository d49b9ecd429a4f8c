use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Infrastructure failures that can surface from any handler. User-facing
/// outcomes (duplicate username, bad credentials, ...) are separate enums
/// at the service layer; reaching this type means a 500.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("session token error: {0}")]
    SessionToken(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("request failed: {self}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.").into_response()
    }
}
