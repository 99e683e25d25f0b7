//! Application error types
//!
//! Failures while wiring and running the service: configuration, store
//! connection, adapter construction and the listener.

use randomizer_core::DomainError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Settings store unavailable: {0}")]
    Store(String),

    #[error("Invalid service wiring: {0}")]
    Wiring(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn wiring(msg: impl Into<String>) -> Self {
        Self::Wiring(msg.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Stable identifier for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Store(_) => "STORE_UNAVAILABLE",
            Self::Wiring(_) => "WIRING_ERROR",
            Self::Domain(e) => e.code(),
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying startup later can succeed without a config change
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Store(_) | Self::Io(_) => true,
            Self::Domain(e) => e.is_infrastructure(),
            Self::Config(_) | Self::Wiring(_) | Self::Internal(_) => false,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
