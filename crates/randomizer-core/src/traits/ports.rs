//! Ports - interfaces to the host platform, the blob store and content sources
//!
//! The domain layer defines what it needs; the store and service crates
//! provide the implementations.

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::{PlatformIdentity, Team, TeamMember};
use crate::error::DomainError;

/// Result type for port operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Key-Value Store
// ============================================================================

/// Remote key-value blob store (no server-side merge, last write wins)
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if never written
    async fn get_value(&self, key: &str) -> RepoResult<Option<Value>>;

    /// Replace the whole value
    async fn set_value(&self, key: &str, value: &Value) -> RepoResult<()>;
}

// ============================================================================
// Team Directory
// ============================================================================

/// Host identity, team and project directory services
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// List teams of a project
    async fn list_teams(&self, project_id: &str) -> RepoResult<Vec<Team>>;

    /// One page of a team's direct membership
    async fn team_members(
        &self,
        project_id: &str,
        team_id: &str,
        top: usize,
        skip: usize,
    ) -> RepoResult<Vec<TeamMember>>;

    /// Free-text user search
    async fn search_identities(&self, query: &str) -> RepoResult<Vec<PlatformIdentity>>;
}

// ============================================================================
// Content Source
// ============================================================================

/// Static daily content documents
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Raw question dataset
    async fn fetch_questions(&self) -> RepoResult<Value>;

    /// Raw holiday dataset
    async fn fetch_holidays(&self) -> RepoResult<Value>;
}
