//! Team listing handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use randomizer_core::default_team_id;
use randomizer_service::{dto::TeamsResponse, RosterService};
use serde::Deserialize;

use crate::response::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsQuery {
    pub context_team_id: Option<String>,
    pub configured_team_id: Option<String>,
}

/// List a project's teams with the team a panel would open on
///
/// GET /projects/{project_id}/teams
pub async fn list_teams(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<TeamsQuery>,
) -> ApiResult<Json<TeamsResponse>> {
    let teams = RosterService::new(state.service_context())
        .list_teams(&project_id)
        .await?;
    let default_team_id = default_team_id(
        &teams,
        query.context_team_id.as_deref(),
        query.configured_team_id.as_deref(),
    );

    Ok(Json(TeamsResponse {
        teams,
        default_team_id,
    }))
}
