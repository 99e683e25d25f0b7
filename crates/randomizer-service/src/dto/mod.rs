//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs and session views for API outputs

pub mod requests;
pub mod responses;

pub use requests::{
    AddMemberRequest, OpenPanelRequest, OpenSettingsRequest, SelectTeamRequest,
    SuggestIdentitiesRequest, ToggleMemberRequest,
};

pub use responses::{
    HealthResponse, PanelView, SessionResponse, SettingsView, SuggestionsResponse, TeamsResponse,
};
