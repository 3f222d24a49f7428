//! Error types for the HTTP boundary.

use std::error::Error;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::store::StoreError;

/// Error returned by the `/person/` handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Request body is not a person JSON object.
    MalformedInput(String),
    /// Id is not a positive integer, or a path id does not parse.
    InvalidId(String),
    /// `DELETE /person/` without an id segment.
    MissingId,
    /// `GET /person/{id}` found nothing.
    PersonNotFound(i64),
    /// The store rejected or failed the operation.
    Store(StoreError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MalformedInput(msg) => {
                write!(f, "body should be a person json: {}", msg)
            }
            ApiError::InvalidId(msg) => write!(f, "invalid id: {}", msg),
            ApiError::MissingId => write!(f, "Id must be provided in the url"),
            ApiError::PersonNotFound(id) => write!(f, "Person {} not found", id),
            ApiError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedInput(err.to_string())
    }
}

impl ApiError {
    /// Map this error to an HTTP status code.
    ///
    /// Store failures, storage errors included, are reported as 400.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingId => StatusCode::BAD_REQUEST,
            ApiError::PersonNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(status = status.as_u16(), error = %self, "request failed");
        (status, self.to_string()).into_response()
    }
}
