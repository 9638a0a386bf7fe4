use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forms::{Locale, ValidationError, payloads::ErrorBody};
use thiserror::Error;

/// Failures of the atomic numbering step other than a missing counter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Gave up after {attempts} conflicting attempts")]
    ConflictExhausted { attempts: u32 },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Store error: {0}")]
    Backend(String),
}

impl TransactionError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransactionError::ConflictExhausted { .. } => "conflict_exhausted",
            TransactionError::Unavailable(_) => "unavailable",
            TransactionError::PermissionDenied(_) => "permission_denied",
            TransactionError::Backend(_) => "backend",
        }
    }

    /// Whether resubmitting the same form may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransactionError::ConflictExhausted { .. } | TransactionError::Unavailable(_)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Deployment problem, the counter record was never created.
    #[error("Counter document {0} does not exist")]
    MissingCounter(&'static str),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{error}")]
    Submit { error: SubmitError, locale: Locale },

    #[error("Store unavailable")]
    Unavailable,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MalformedPayload => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Submit { error, locale } => {
                let messages = locale.messages();

                // both failure kinds share one message, only logs tell them apart
                let (status, message) = match error {
                    SubmitError::Invalid(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, messages.invalid_form)
                    }
                    SubmitError::MissingCounter(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, messages.submit_failed)
                    }
                    SubmitError::Transaction(e) if e.is_transient() => {
                        (StatusCode::SERVICE_UNAVAILABLE, messages.submit_failed)
                    }
                    SubmitError::Transaction(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, messages.submit_failed)
                    }
                };

                (status, message.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
