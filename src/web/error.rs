use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::fmt;

use super::templates;

#[derive(Debug)]
pub enum WebError {
    DatabaseError(String),

    SessionError(String),

    Unauthorized,

    ValidationError(String),

    InternalError(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            WebError::SessionError(msg) => write!(f, "Session error: {}", msg),
            WebError::Unauthorized => write!(f, "Login required"),
            WebError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            WebError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for WebError {}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self {
            // Browser-facing app: unauthenticated requests go to the login
            // form instead of a bare 401.
            WebError::Unauthorized => Redirect::to("/login/").into_response(),
            WebError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                Html(templates::error_page("Bad request", msg)),
            )
                .into_response(),
            WebError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(templates::error_page(
                        "Something went wrong",
                        "A database error occurred",
                    )),
                )
                    .into_response()
            }
            WebError::SessionError(msg) | WebError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(templates::error_page(
                        "Something went wrong",
                        "An internal error occurred",
                    )),
                )
                    .into_response()
            }
        }
    }
}

impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> Self {
        WebError::InternalError(err.to_string())
    }
}

impl WebError {
    pub fn database(msg: impl Into<String>) -> Self {
        WebError::DatabaseError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        WebError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        WebError::InternalError(msg.into())
    }
}
