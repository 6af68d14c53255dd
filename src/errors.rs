use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Errors raised by the service layer.
///
/// Storage errors pass through unchanged; the enclosing transaction is rolled
/// back when it is dropped without a commit.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("missing or unknown actor")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("project {0} does not exist")]
    ProjectNotFound(i64),
    #[error("bucket {0} does not exist")]
    BucketNotFound(i64),
    #[error("task {0} does not exist")]
    TaskNotFound(i64),
    #[error("user {0} does not exist")]
    UserNotFound(i64),
    #[error("cannot remove last bucket {bucket_id} of project {project_id}")]
    LastBucket { bucket_id: i64, project_id: i64 },
    #[error("bucket {bucket_id} has reached its limit of {limit} tasks")]
    BucketLimitExceeded { bucket_id: i64, limit: i64 },
    #[error("{0}")]
    FilterSyntax(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Stable numeric code sent alongside the message so clients can branch on it.
    pub fn code(&self) -> u32 {
        match self {
            ServiceError::Validation(_) => 2002,
            ServiceError::Unauthenticated => 1001,
            ServiceError::Forbidden => 4001,
            ServiceError::ProjectNotFound(_) => 3001,
            ServiceError::BucketNotFound(_) => 10001,
            ServiceError::TaskNotFound(_) => 4002,
            ServiceError::UserNotFound(_) => 1005,
            ServiceError::LastBucket { .. } => 10002,
            ServiceError::BucketLimitExceeded { .. } => 10004,
            ServiceError::FilterSyntax(_) => 4024,
            ServiceError::Sqlx(_) => 0,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::FilterSyntax(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::ProjectNotFound(_)
            | ServiceError::BucketNotFound(_)
            | ServiceError::TaskNotFound(_)
            | ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::LastBucket { .. } | ServiceError::BucketLimitExceeded { .. } => {
                StatusCode::PRECONDITION_FAILED
            }
            ServiceError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: u32,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            code: 0,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16(),
            "code": self.code,
        }));

        (self.status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        if let ServiceError::Sqlx(inner) = &err {
            tracing::error!("storage failure: {}", inner);
            return AppError::internal("internal server error");
        }
        Self {
            status: err.status(),
            code: err.code(),
            message: err.to_string(),
        }
    }
}
