pub mod delivery_fee;

use axum::{
    Json,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::delivery_request::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation errors")]
    Validation(#[from] ValidationErrors),

    #[error("The requested URL was not found on the server.")]
    NotFound,

    #[error("The method is not allowed for the requested URL.")]
    MethodNotAllowed { allow: Method },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": message, "errors": errors })),
            )
                .into_response(),
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            ApiError::MethodNotAllowed { allow } => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, allow.to_string())],
                Json(json!({ "message": message })),
            )
                .into_response(),
        }
    }
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
