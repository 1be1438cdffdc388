// In crates/web-server/src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::types::ErrorBody;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] engine::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Failed to bind server address")]
    ServerBindError(#[source] std::io::Error),

    #[error("Server terminated with an error")]
    ServeError(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            // The UI shows a retry action for this, never a "zero trades" view.
            Error::Engine(engine::Error::Storage(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Engine(engine::Error::Superseded { .. }) => StatusCode::CONFLICT,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed.");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
