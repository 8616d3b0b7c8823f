use offstage_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Transport-level failure: connection refused, DNS, or the submission
    /// timeout elapsing before the worker acknowledged.
    #[error("encoder request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The worker answered with a non-success status.
    #[error("encoder returned {status:?}: {body}")]
    Submission { status: Option<u16>, body: String },

    /// The worker acknowledged but the body was not a usable ack.
    #[error("invalid acknowledgement from encoder: {0}")]
    InvalidAck(String),
}

impl EncodeError {
    /// HTTP status of the failed submission, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            EncodeError::Network(err) => err.status().map(|s| s.as_u16()),
            EncodeError::Submission { status, .. } => *status,
            EncodeError::InvalidAck(_) => None,
        }
    }
}

impl From<EncodeError> for AppError {
    fn from(err: EncodeError) -> Self {
        AppError::SubmissionFailed {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offstage_core::ErrorMetadata;

    #[test]
    fn test_submission_error_keeps_status_and_body() {
        let err = EncodeError::Submission {
            status: Some(503),
            body: "queue full".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("queue full"));
    }

    #[test]
    fn test_conversion_to_app_error() {
        let err = EncodeError::Submission {
            status: Some(500),
            body: "boom".to_string(),
        };
        let app: AppError = err.into();
        match &app {
            AppError::SubmissionFailed { status, message } => {
                assert_eq!(*status, Some(500));
                assert!(message.contains("boom"));
            }
            other => panic!("expected SubmissionFailed, got {:?}", other),
        }
        assert_eq!(app.error_code(), "SUBMISSION_FAILED");
    }
}
