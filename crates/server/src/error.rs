use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("missing query parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("{0}")]
    Internal(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn bad_request(detail: impl std::fmt::Display) -> Self {
        ServerError::BadRequest(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) | ServerError::MissingParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Internal(_) | ServerError::Bind { .. } | ServerError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
