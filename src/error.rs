//! Error taxonomy for the pipeline.
//!
//! Errors are data, not control flow, from the task flow outward: the public
//! [`crate::app::App`] operations fold every failure into an `ApiResponse`,
//! and the per-task workflow folds them into a `ProcessingOutcome`. Inside
//! the crate, fallible functions return [`AppResult`] and propagate with `?`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Caller's fault: missing credential or identifier. Reported
    /// immediately, no remote call is attempted.
    #[error("input error: {0}")]
    Input(String),

    /// Login rejected or the response carried no token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Non-2xx or malformed response from the remote platform. Never retried.
    #[error("remote service error ({endpoint}): {message}")]
    RemoteService { endpoint: String, message: String },

    /// A single question's synthesis failed. Contained to that question.
    #[error("transform error (question {question_id}): {message}")]
    Transform {
        question_id: String,
        message: String,
    },

    /// Unexpected fault anywhere in the pipeline.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn input(msg: impl Into<String>) -> Self {
        AppError::Input(msg.into())
    }

    pub fn remote(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::RemoteService {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.path().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        AppError::RemoteService {
            endpoint,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("json: {}", err))
    }
}

/// Crate-wide result alias.
pub type AppResult<T> = Result<T, AppError>;
