use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use taskpad_app::AppError;
use taskpad_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ServerError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<AppError> for ServerError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotCommentAuthor => ServerError::Forbidden(err.to_string()),
            AppError::NotFound => ServerError::NotFound,
            AppError::Store(_) | AppError::Provider(_) | AppError::Clipboard(_) => {
                ServerError::Internal(err.to_string())
            }
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        ServerError::Internal(err.to_string())
    }
}
