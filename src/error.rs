use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report rendering error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Insufficient data: no rated history to derive a {category} default")]
    InsufficientData { category: &'static str },

    #[error("Insufficient training data: {found} rated entries, at least {required} required")]
    InsufficientTrainingData { required: usize, found: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientData { .. } | AppError::InsufficientTrainingData { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::HttpClient(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::HttpClient(_) | AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Cache(_) | AppError::Io(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Recommendation run failed");
        } else {
            tracing::warn!(error = %self, status = %status, "Recommendation run rejected");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
