//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Selection
    // =========================================================================
    #[error("No eligible members left to select")]
    NoCandidates,

    #[error("Nothing to undo")]
    NothingToUndo,

    // =========================================================================
    // Daily Content
    // =========================================================================
    #[error("No valid questions available")]
    NoQuestionsAvailable,

    #[error("No holiday options available")]
    NoHolidaysAvailable,

    // =========================================================================
    // Roster Editing
    // =========================================================================
    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Member already exists: {0}")]
    MemberAlreadyExists(String),

    #[error("Member conflicts with team member: {0}")]
    MemberConflict(String),

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Store error: {0}")]
    Store(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Content error: {0}")]
    Content(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCandidates => "NO_CANDIDATES",
            Self::NothingToUndo => "NOTHING_TO_UNDO",
            Self::NoQuestionsAvailable => "NO_QUESTIONS_AVAILABLE",
            Self::NoHolidaysAvailable => "NO_HOLIDAYS_AVAILABLE",
            Self::UnknownMember(_) => "UNKNOWN_MEMBER",
            Self::MemberAlreadyExists(_) => "MEMBER_ALREADY_EXISTS",
            Self::MemberConflict(_) => "MEMBER_CONFLICT",
            Self::InvalidIdentity(_) => "INVALID_IDENTITY",
            Self::Store(_) => "STORE_ERROR",
            Self::Directory(_) => "DIRECTORY_ERROR",
            Self::Content(_) => "CONTENT_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownMember(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidIdentity(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::MemberAlreadyExists(_)
                | Self::MemberConflict(_)
                | Self::NoCandidates
                | Self::NothingToUndo
        )
    }

    /// Check if this wraps an infrastructure failure
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Directory(_) | Self::Content(_))
    }

    /// HTTP status the error surfaces as
    pub fn status_code(&self) -> u16 {
        if self.is_not_found() {
            404
        } else if self.is_validation() {
            400
        } else if self.is_conflict() {
            409
        } else if self.is_infrastructure() {
            502
        } else {
            422
        }
    }
}
