//! # randomizer-service
//!
//! Application layer containing the randomizer use cases, DTOs and the
//! HTTP adapters for the host platform and the daily content documents.

pub mod adapters;
pub mod dto;
pub mod services;

pub use adapters::{HttpContentSource, RestTeamDirectory};
pub use services::{
    PanelService, PanelSession, RosterService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, SessionHandle, SettingsService, SettingsSession,
};
