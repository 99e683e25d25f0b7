//! Service layer error types
//!
//! Every session action fails with one of these after recording a status
//! message on the session.

use randomizer_common::AppError;
use randomizer_core::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Platform roster or team listing could not be fetched
    #[error("Roster load failed: {0}")]
    RosterLoad(String),

    /// Question or holiday dataset could not be fetched or used
    #[error("Content load failed: {0}")]
    ContentLoad(String),

    /// The settings blob could not be read back or written
    #[error("Persistence failed: {0}")]
    PersistenceWrite(String),

    /// Another action is still in flight for the session
    #[error("Another action is in progress")]
    Busy,

    /// The session was closed while the action was suspended
    #[error("Session was closed")]
    Detached,

    /// Action attempted inside its minimum interval
    #[error("Action attempted too soon")]
    Throttled,

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn roster_load(msg: impl Into<String>) -> Self {
        Self::RosterLoad(msg.into())
    }

    pub fn content_load(msg: impl Into<String>) -> Self {
        Self::ContentLoad(msg.into())
    }

    pub fn persistence_write(msg: impl Into<String>) -> Self {
        Self::PersistenceWrite(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status the error surfaces as
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => e.status_code(),
            Self::RosterLoad(_) | Self::ContentLoad(_) => 502,
            Self::PersistenceWrite(_) => 503,
            Self::Busy => 409,
            Self::Detached => 410,
            Self::Throttled => 429,
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::RosterLoad(_) => "ROSTER_LOAD_ERROR",
            Self::ContentLoad(_) => "CONTENT_LOAD_ERROR",
            Self::PersistenceWrite(_) => "PERSISTENCE_WRITE_ERROR",
            Self::Busy => "SESSION_BUSY",
            Self::Detached => "SESSION_CLOSED",
            Self::Throttled => "TOO_MANY_REQUESTS",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Service errors raised while wiring the application at startup
impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::Validation(msg) => AppError::Wiring(msg),
            ServiceError::PersistenceWrite(msg) => AppError::Store(msg),
            other => AppError::Internal(anyhow::anyhow!(other.to_string())),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
