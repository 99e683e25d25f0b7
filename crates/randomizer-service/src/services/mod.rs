//! Business logic services
//!
//! This module contains the roster, selection cycle, daily content and
//! settings use cases, plus the session handles the API layer keeps them in.

pub mod context;
pub mod daily_content;
pub mod error;
pub mod panel;
pub mod roster;
pub mod selection;
pub mod session;
pub mod settings_editor;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export all services for convenience
pub use context::{RandomFactory, ServiceContext, ServiceContextBuilder};
pub use daily_content::{select_next_holiday, select_next_question, DailyContentCache};
pub use error::{ServiceError, ServiceResult};
pub use panel::{PanelService, PanelSession};
pub use roster::{merge_roster, sort_members, RosterService, SortColumn, SortDirection, SortState};
pub use selection::{RandomizeOutcome, SelectionSnapshot, SelectionState};
pub use session::{Attached, BusyGuard, Liveness, SessionHandle};
pub use settings_editor::{SettingsService, SettingsSession};
pub use status::{StatusKind, StatusMessage};
