use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pricing_types::errors::PricingError;
use serde_json::json;
use thiserror::Error;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    /// Request rejected before reaching the engine
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::Pricing(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if err.is_client_error() {
                    tracing::warn!(error = %err, "Request rejected");
                } else {
                    tracing::error!(error = %err, "Request failed");
                }
                (status, err.kind(), err.to_string())
            }
        };

        let body = Json(json!({
            "error": code,
            "code": status.as_u16(),
            "message": message
        }));

        (status, body).into_response()
    }
}
