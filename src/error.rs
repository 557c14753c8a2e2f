use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// No row matched the request.
    #[error("{0}")]
    NotFound(String),

    /// Unique value already taken (duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// A multi-row write failed and was rolled back.
    #[error("{message}: {cause}")]
    Transaction { message: String, cause: String },

    /// Rejected file upload (type, size, or malformed multipart body).
    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Wrap a failure raised while a transaction was open.
    pub fn transaction(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        AppError::Transaction {
            message: message.into(),
            cause: cause.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) | AppError::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Transaction { .. } | AppError::Internal(_) | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::Transaction { message, cause } => {
                tracing::error!(error = %cause, "{}", message);
                json!({ "message": message, "error": cause })
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                json!({ "message": "Internal server error" })
            }
            AppError::Internal(msg) => {
                tracing::error!("{}", msg);
                json!({ "message": msg })
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
