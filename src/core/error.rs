use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Non-positive or over-precise payment amount, rejected before any write
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced student, invoice, fee head, structure or payment does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A fee structure already exists for the (course, fee head) pair
    #[error("Fee structure already exists for course {course_id} and fee head {fee_head_id}")]
    DuplicateStructure { course_id: i64, fee_head_id: i64 },

    /// Lock or transaction contention on a student's invoice set; safe to retry
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Storage failure reported by a repository
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
                "retryable": self.is_retryable(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateStructure { .. } => StatusCode::CONFLICT,
            AppError::ConcurrencyConflict(_) => StatusCode::CONFLICT,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        AppError::InvalidAmount(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::ConcurrencyConflict(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        AppError::Persistence(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Only lock contention is worth re-submitting unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ConcurrencyConflict(_))
    }

    /// Map a sqlx error raised while running `context`, classifying MySQL
    /// deadlocks (1213) and lock wait timeouts (1205) as retryable conflicts.
    pub fn from_db(context: &str, err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if let Some(mysql_err) =
                db_err.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
            {
                if matches!(mysql_err.number(), 1205 | 1213) {
                    return AppError::ConcurrencyConflict(format!("{}: {}", context, err));
                }
            }
        }
        if matches!(err, sqlx::Error::PoolTimedOut) {
            return AppError::ConcurrencyConflict(format!("{}: {}", context, err));
        }
        AppError::Persistence(format!("{}: {}", context, err))
    }
}
