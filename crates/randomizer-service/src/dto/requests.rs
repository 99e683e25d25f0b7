//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use randomizer_core::{PanelConfiguration, PickerIdentity};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Panel Requests
// ============================================================================

/// Open a randomizer panel
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OpenPanelRequest {
    /// Project id from the host context
    #[validate(length(min = 1, max = 256, message = "Project id must be 1-256 characters"))]
    pub project_id: Option<String>,

    /// Configuration payload handed over by the host
    #[serde(default)]
    pub configuration: Option<PanelConfiguration>,

    /// Team the host is currently showing
    #[validate(length(min = 1, max = 256, message = "Team id must be 1-256 characters"))]
    pub context_team_id: Option<String>,
}

impl OpenPanelRequest {
    /// Configured project first, then the host context project
    pub fn resolved_project_id(&self) -> Option<&str> {
        self.configuration
            .as_ref()
            .and_then(PanelConfiguration::project_id)
            .filter(|id| !id.is_empty())
            .or(self.project_id.as_deref())
    }

    pub fn configured_team_id(&self) -> Option<&str> {
        self.configuration
            .as_ref()
            .and_then(PanelConfiguration::team_id)
    }
}

/// Switch the team shown by a panel or the settings editor
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelectTeamRequest {
    #[validate(length(min = 1, max = 256, message = "Team id must be 1-256 characters"))]
    pub team_id: String,
}

// ============================================================================
// Settings Requests
// ============================================================================

/// Open the settings editor
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OpenSettingsRequest {
    #[validate(length(min = 1, max = 256, message = "Project id must be 1-256 characters"))]
    pub project_id: String,

    #[validate(length(min = 1, max = 256, message = "Team id must be 1-256 characters"))]
    pub team_id: Option<String>,
}

/// Include or exclude one roster member
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ToggleMemberRequest {
    #[validate(length(min = 1, max = 256, message = "Member id must be 1-256 characters"))]
    pub member_id: String,

    pub selected: bool,
}

/// Identity picker query
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuggestIdentitiesRequest {
    #[validate(length(max = 256, message = "Query must be at most 256 characters"))]
    #[serde(default)]
    pub query: String,

    /// Ids already chosen in the picker
    #[serde(default)]
    pub selected_ids: Vec<String>,
}

/// Add a member from free text or from a picked identity
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    #[validate(length(min = 1, max = 256, message = "Input must be 1-256 characters"))]
    pub input: Option<String>,

    pub identity: Option<PickerIdentity>,
}
