use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{error}")]
    BadRequest {
        error: String,
        details: Option<String>,
    },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        AppError::BadRequest {
            error: error.into(),
            details: None,
        }
    }

    pub fn bad_request_with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        AppError::BadRequest {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: "Unauthorized".to_string(),
                    details: None,
                },
            ),
            AppError::BadRequest { error, details } => {
                (StatusCode::BAD_REQUEST, ErrorResponse { error, details })
            }
            AppError::Internal(_) => (
                // Don't leak internal error detail to client
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    details: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
