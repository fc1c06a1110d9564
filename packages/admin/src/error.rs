//! HTTP error responses for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lexpanel_client::ClientError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("not authenticated")]
    Unauthenticated,

    #[error("this account may not use the admin console")]
    Forbidden,

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::UnknownResource(_) => StatusCode::NOT_FOUND,
            ApiError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Client(e) => match e {
                ClientError::Unauthorized => StatusCode::UNAUTHORIZED,
                ClientError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ClientError::Status { status: 404, .. } => StatusCode::NOT_FOUND,
                ClientError::Http(_) | ClientError::Status { .. } | ClientError::Decode { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                ClientError::Config(_)
                | ClientError::Csv(_)
                | ClientError::Json(_)
                | ClientError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Client(ClientError::Validation(message)) => message.clone(),
            ApiError::Client(ClientError::Status { message, .. }) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, %status, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
