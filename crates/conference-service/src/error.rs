use conference_constraints::{ConstraintError, ValidationFailure};
use conference_types::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a cache or store collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{backend} backend failed: {message}")]
pub struct BackendError {
    pub backend: &'static str,
    pub message: String,
}

impl BackendError {
    pub fn new(backend: &'static str, message: impl Into<String>) -> Self {
        Self {
            backend,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditorError {
    #[error("no authenticated user")]
    Unauthenticated,
    /// An authenticated identity with no user record behind it.
    #[error("authenticated user {external_id} has no user record")]
    UserNotFound { external_id: String },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Auditor(#[from] AuditorError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("command is missing required field `{field}`")]
    IncompleteCommand { field: &'static str },
}

/// Stable, enumerable code for every condition a use case can raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationFailed,
    EventNotFound,
    SessionNotFound,
    UserNotFound,
    Unauthenticated,
    DataIntegrityFailure,
    InvalidCredentials,
    EmailTaken,
    BackendUnavailable,
    Internal,
}

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error("malformed identifier: {0}")]
    Malformed(#[from] DomainError),
    #[error("event {id} not found")]
    EventNotFound { id: String },
    #[error("session {session_id} of event {event_id} not found")]
    SessionNotFound { event_id: String, session_id: String },
    #[error("user {id} not found")]
    UserNotFound { id: String },
    #[error("authentication required")]
    Unauthenticated,
    #[error("data integrity failure: {0}")]
    DataIntegrity(String),
    /// Deliberately the same for an unknown email and a wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email address is already registered")]
    EmailTaken,
    #[error(transparent)]
    Backend(BackendError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl UseCaseError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::Malformed(_) => ErrorCode::ValidationFailed,
            Self::EventNotFound { .. } => ErrorCode::EventNotFound,
            Self::SessionNotFound { .. } => ErrorCode::SessionNotFound,
            Self::UserNotFound { .. } => ErrorCode::UserNotFound,
            Self::Unauthenticated => ErrorCode::Unauthenticated,
            Self::DataIntegrity(_) => ErrorCode::DataIntegrityFailure,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::EmailTaken => ErrorCode::EmailTaken,
            Self::Backend(_) => ErrorCode::BackendUnavailable,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<AuditorError> for UseCaseError {
    fn from(error: AuditorError) -> Self {
        match error {
            AuditorError::Unauthenticated => Self::Unauthenticated,
            AuditorError::UserNotFound { .. } => Self::DataIntegrity(error.to_string()),
            AuditorError::Backend(backend) => Self::Backend(backend),
        }
    }
}

impl From<RepositoryError> for UseCaseError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Backend(backend) => Self::Backend(backend),
            RepositoryError::Auditor(auditor) => auditor.into(),
            RepositoryError::Domain(domain) => Self::Malformed(domain),
            RepositoryError::IncompleteCommand { .. } => Self::Internal(error.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}, expected {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Failure while wiring a [`ConferenceService`](crate::ConferenceService).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("constraint tables rejected: {0}")]
    Constraints(#[from] ConstraintError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
