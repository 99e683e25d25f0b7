//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{health, panel, settings, teams};
use crate::state::AppState;

/// Create the main API router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(team_routes())
        .merge(panel_routes())
        .merge(settings_routes())
}

fn team_routes() -> Router<AppState> {
    Router::new().route("/projects/:project_id/teams", get(teams::list_teams))
}

/// Randomizer panel routes
fn panel_routes() -> Router<AppState> {
    Router::new()
        .route("/panels", post(panel::open_panel))
        .route("/panels/:session_id", get(panel::get_panel))
        .route("/panels/:session_id", delete(panel::close_panel))
        .route("/panels/:session_id/team", put(panel::select_team))
        .route("/panels/:session_id/randomize", post(panel::randomize))
        .route("/panels/:session_id/previous", post(panel::select_previous))
        .route("/panels/:session_id/reset", post(panel::reset))
        .route("/panels/:session_id/question", post(panel::refresh_question))
        .route("/panels/:session_id/holiday", post(panel::refresh_holiday))
}

/// Settings editor routes
fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/settings", post(settings::open_settings))
        .route("/settings/:session_id", get(settings::get_settings))
        .route("/settings/:session_id", delete(settings::close_settings))
        .route("/settings/:session_id/team", put(settings::select_team))
        .route("/settings/:session_id/sort", put(settings::set_sort))
        .route("/settings/:session_id/toggle", post(settings::toggle_member))
        .route("/settings/:session_id/select-all", post(settings::select_all))
        .route("/settings/:session_id/deselect-all", post(settings::deselect_all))
        .route("/settings/:session_id/suggestions", post(settings::suggest_identities))
        .route("/settings/:session_id/members", post(settings::add_member))
        .route(
            "/settings/:session_id/members/:member_id",
            delete(settings::remove_member),
        )
        .route("/settings/:session_id/save", post(settings::save))
}
