//! User-visible status line shared by the panel and the settings editor

use serde::Serialize;

pub const PANEL_INIT_FAILURE: &str = "Unable to load the randomizer. Please refresh and try again.";
pub const TEAM_LOAD_ERROR: &str = "Unable to load team members. Please try again.";
pub const RANDOMIZE_RECORD_ERROR: &str = "Unable to record the selection. Please try again.";
pub const RANDOMIZE_RESET_ERROR: &str = "Unable to reset selections. Please try again.";
pub const RANDOMIZE_REVERT_ERROR: &str = "Unable to go back to the previous member. Please try again.";
pub const CYCLE_COMPLETE: &str = "Everyone has had a turn today. Reset to start again.";
pub const QOD_LOAD_ERROR: &str = "Unable to load Question of the Day. Please try again.";
pub const HOD_LOAD_ERROR: &str = "Unable to load Holiday of the Day. Please try again.";
pub const NO_HOLIDAYS: &str = "No holidays found for today.";
pub const MEMBER_ADDED: &str = "Member added. Save to keep your changes.";
pub const MEMBER_REMOVED: &str = "Member removed. Save to keep your changes.";
pub const MEMBER_EXISTS: &str = "That member is already in the list.";
pub const MEMBER_CONFLICT: &str = "That person is already a member of this team.";
pub const SAVE_WAIT: &str = "Please wait a moment before saving again.";
pub const SAVE_SUCCESS: &str = "Settings saved.";
pub const SAVE_FAILURE: &str = "Unable to save settings. Please try again.";
pub const UNKNOWN_MEMBER_UPDATE: &str = "Unable to update that member. Please refresh and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Error,
    Success,
}

/// Transient status shown next to the controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    #[serde(rename = "type")]
    pub kind: StatusKind,
    pub message: String,
}

impl StatusMessage {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}
