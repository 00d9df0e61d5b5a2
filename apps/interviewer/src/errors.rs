use thiserror::Error;

/// Service-level error type returned by the interview boundary operations.
///
/// Downstream completion failures never appear here: the orchestrator and the
/// evaluator absorb them and fall back. What remains are contract violations
/// from the caller and storage failures.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid interview state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code, used when the driver reports an error.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                "DATABASE_ERROR"
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "INTERNAL_ERROR"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AppError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(AppError::Validation("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(AppError::InvalidState("x".into()).code(), "INVALID_STATE");
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_display_includes_detail() {
        let err = AppError::Validation("job_role cannot be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: job_role cannot be empty");
    }
}
