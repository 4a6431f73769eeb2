use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures that end a webhook delivery before a `{"ok": true}` reply.
#[derive(Debug, Error)]
pub enum IngressError {
    #[error("forbidden")]
    Forbidden,
    #[error("malformed update: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("reply delivery failed: {0:#}")]
    Delivery(anyhow::Error),
}

impl IngressError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngressError::Forbidden => StatusCode::FORBIDDEN,
            IngressError::Decode(_) => StatusCode::BAD_REQUEST,
            IngressError::Delivery(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
