//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chisquare::ChiSquareError;
use serde::Serialize;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from client.
    BadRequest(String),
    /// Error from the chisquare library.
    ChiSquare(ChiSquareError),
    /// Internal server error.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Machine-readable code for a library error.
fn error_code(err: &ChiSquareError) -> &'static str {
    match err {
        ChiSquareError::InvalidSelection(_) => "invalid_selection",
        ChiSquareError::EmptyDataset(_) => "empty_dataset",
        ChiSquareError::TooFewColumns { .. } => "too_few_columns",
        ChiSquareError::InsufficientCategories { .. } => "insufficient_categories",
        ChiSquareError::DegenerateMarginal { .. } => "degenerate_marginal",
        ChiSquareError::ShapeMismatch(_) => "shape_mismatch",
        ChiSquareError::Distribution(_) => "distribution",
        ChiSquareError::Io { .. } => "io",
        ChiSquareError::Parse { .. } | ChiSquareError::Csv(_) => "parse",
        ChiSquareError::Json(_) => "json",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::ChiSquare(e) => {
                let status = match e {
                    ChiSquareError::Io { .. } | ChiSquareError::Json(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, error_code(&e), e.to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<ChiSquareError> for ApiError {
    fn from(err: ChiSquareError) -> Self {
        ApiError::ChiSquare(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("worker task failed: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ChiSquare(e) => write!(f, "Chi-Square error: {}", e),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
