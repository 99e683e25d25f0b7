//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use randomizer_core::{MemberView, PickerIdentity, QuestionOfDay, Team};
use serde::Serialize;
use uuid::Uuid;

use crate::services::roster::SortState;
use crate::services::status::StatusMessage;

// ============================================================================
// Common Response Types
// ============================================================================

/// View of an open session together with its handle id
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse<T> {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub view: T,
}

impl<T> SessionResponse<T> {
    pub fn new(session_id: Uuid, view: T) -> Self {
        Self { session_id, view }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Team Responses
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_team_id: Option<String>,
}

// ============================================================================
// Panel Responses
// ============================================================================

/// Everything the randomizer panel renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub project_id: String,
    pub teams: Vec<Team>,
    pub team_id: Option<String>,
    pub day_key: String,
    pub members: Vec<MemberView>,
    pub completed_ids: Vec<String>,
    pub history: Vec<String>,
    pub current_member: Option<MemberView>,
    pub eligible_members: Vec<MemberView>,
    pub total_members: usize,
    pub completed_count: usize,
    pub remaining_count: usize,
    pub has_active_pending: bool,
    pub is_cycle_complete: bool,
    pub disable_randomize: bool,
    pub disable_previous: bool,
    pub disable_reset: bool,
    pub question: Option<QuestionOfDay>,
    pub holiday: Option<String>,
    pub is_team_loading: bool,
    pub is_saving: bool,
    pub is_question_loading: bool,
    pub is_holiday_loading: bool,
    pub status: Option<StatusMessage>,
}

// ============================================================================
// Settings Responses
// ============================================================================

/// Everything the settings editor renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub project_id: String,
    pub teams: Vec<Team>,
    pub team_id: Option<String>,
    pub members: Vec<MemberView>,
    pub selected_ids: Vec<String>,
    pub selection_fingerprint: String,
    pub sort: SortState,
    pub is_dirty: bool,
    pub is_team_loading: bool,
    pub is_saving: bool,
    pub status: Option<StatusMessage>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub identities: Vec<PickerIdentity>,
}
