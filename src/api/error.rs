use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::ReqdeckError;

/// 错误响应体：`{ "error": "<message>" }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Wraps `ReqdeckError` so handlers can use `?` and still answer with JSON.
#[derive(Debug)]
pub struct ApiError(pub ReqdeckError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            ReqdeckError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ReqdeckError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReqdeckError> for ApiError {
    fn from(err: ReqdeckError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("API Error: {}", self.0);
        } else {
            tracing::debug!(status = status.as_u16(), "rejected request: {}", self.0);
        }

        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
