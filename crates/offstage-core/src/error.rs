//! Error types module
//!
//! All errors are unified under the `AppError` enum: database and transport
//! failures plus the transcoding domain errors (ownership, state machine,
//! submission, retry cap). `ErrorMetadata` lets each variant self-describe
//! its HTTP response characteristics.

use sqlx::Error as SqlxError;

use crate::models::MediaStatus;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like state-machine rejections
    Debug,
    /// Warning level - for suspicious but recoverable conditions
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "SUBMISSION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the operation can succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[error("Media item not found: {0}")]
    NotFound(String),

    #[error("Media {media_id} is not owned by {owner_id}")]
    Ownership {
        media_id: uuid::Uuid,
        owner_id: uuid::Uuid,
    },

    #[error("Invalid state: media is {current}, expected {expected}")]
    InvalidState {
        current: MediaStatus,
        expected: MediaStatus,
    },

    #[error("Job submission failed (status {status:?}): {message}")]
    SubmissionFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("No media item matches job {0}")]
    JobNotFound(String),

    #[error("Max transcode retries exceeded ({attempts} attempts)")]
    MaxRetriesExceeded { attempts: i32 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the media ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Ownership { .. } => (
            403,
            "OWNERSHIP_ERROR",
            false,
            Some("Verify the media belongs to this creator"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidState { .. } => (
            409,
            "INVALID_STATE",
            false,
            Some("Check the current transcoding status first"),
            false,
            LogLevel::Debug,
        ),
        AppError::SubmissionFailed { .. } => (
            502,
            "SUBMISSION_FAILED",
            true,
            Some("Trigger the transcode again once the encoder recovers"),
            true,
            LogLevel::Error,
        ),
        AppError::JobNotFound(_) => (
            404,
            "JOB_NOT_FOUND",
            false,
            Some("Verify the callback references a known job"),
            false,
            LogLevel::Warn,
        ),
        AppError::MaxRetriesExceeded { .. } => (
            409,
            "MAX_RETRIES_EXCEEDED",
            false,
            Some("Attempt limit reached; upload the media again"),
            false,
            LogLevel::Warn,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check API key or webhook signature"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::NotFound(_) => "NotFound",
            AppError::Ownership { .. } => "Ownership",
            AppError::InvalidState { .. } => "InvalidState",
            AppError::SubmissionFailed { .. } => "SubmissionFailed",
            AppError::JobNotFound(_) => "JobNotFound",
            AppError::MaxRetriesExceeded { .. } => "MaxRetriesExceeded",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including the source chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Ownership { media_id, .. } => {
                format!("Media {} is not owned by the caller", media_id)
            }
            AppError::InvalidState { current, expected } => {
                format!("Media is {}, expected {}", current, expected)
            }
            AppError::SubmissionFailed { .. } => {
                "Failed to submit the job to the encoding worker".to_string()
            }
            AppError::JobNotFound(ref job_id) => {
                format!("No media item matches job {}", job_id)
            }
            AppError::MaxRetriesExceeded { attempts } => {
                format!("Max transcode retries exceeded ({} attempts)", attempts)
            }
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Media item not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Media item not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_ownership_is_distinct_from_not_found() {
        let err = AppError::Ownership {
            media_id: uuid::Uuid::new_v4(),
            owner_id: uuid::Uuid::new_v4(),
        };
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "OWNERSHIP_ERROR");
        assert_ne!(
            err.error_code(),
            AppError::NotFound("x".to_string()).error_code()
        );
    }

    #[test]
    fn test_error_metadata_invalid_state_carries_both_states() {
        let err = AppError::InvalidState {
            current: MediaStatus::Transcoding,
            expected: MediaStatus::Uploaded,
        };
        assert_eq!(err.http_status_code(), 409);
        assert!(err.client_message().contains("transcoding"));
        assert!(err.client_message().contains("uploaded"));
    }

    #[test]
    fn test_error_metadata_submission_failed_is_recoverable_and_sensitive() {
        let err = AppError::SubmissionFailed {
            status: Some(503),
            message: "worker queue full".to_string(),
        };
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(err.error_code(), "SUBMISSION_FAILED");
        assert!(err.is_recoverable());
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
        // Worker response bodies never reach the client verbatim.
        assert!(!err.client_message().contains("worker queue full"));
    }

    #[test]
    fn test_error_metadata_max_retries_is_terminal() {
        let err = AppError::MaxRetriesExceeded { attempts: 3 };
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "MAX_RETRIES_EXCEEDED");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains('3'));
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("connection refused");
        let err = AppError::InternalWithSource {
            message: "submit failed".to_string(),
            source,
        };
        let details = err.detailed_message();
        assert!(details.contains("Caused by: connection refused"));
    }
}
