//! Settings editor handlers
//!
//! Edits are held in the session until `save`.

use axum::{
    extract::{Path, State},
    Json,
};
use randomizer_service::dto::{
    AddMemberRequest, OpenSettingsRequest, SelectTeamRequest, SessionResponse, SettingsView,
    SuggestIdentitiesRequest, SuggestionsResponse, ToggleMemberRequest,
};
use randomizer_service::services::SortState;
use randomizer_service::{SessionHandle, SettingsService};
use tracing::info;
use uuid::Uuid;

use crate::extractors::{OptionalValidatedJson, SessionIdPath, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

type SettingsResponse = Json<SessionResponse<SettingsView>>;

/// Open the settings editor
///
/// POST /settings
pub async fn open_settings(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<OpenSettingsRequest>,
) -> ApiResult<Created<SettingsResponse>> {
    let session = SettingsService::new(state.service_context())
        .open(&request.project_id, request.team_id.as_deref())
        .await?;
    let view = session.view();
    let id = state.settings().insert(SessionHandle::new(session));

    info!(session_id = %id, "Settings session registered");
    Ok(Created(Json(SessionResponse::new(id, view))))
}

/// Current editor view
///
/// GET /settings/{session_id}
pub async fn get_settings(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<SettingsResponse> {
    let handle = state.settings().get(id)?;
    let session = handle.read().await?;
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Close the editor, dropping unsaved edits
///
/// DELETE /settings/{session_id}
pub async fn close_settings(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<NoContent> {
    state.settings().close(id)?;
    Ok(NoContent)
}

/// Switch the edited team
///
/// PUT /settings/{session_id}/team
pub async fn select_team(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
    ValidatedJson(request): ValidatedJson<SelectTeamRequest>,
) -> ApiResult<SettingsResponse> {
    let handle = state.settings().get(id)?;
    let mut session = handle.begin()?;
    SettingsService::new(state.service_context())
        .select_team(&mut session, &request.team_id)
        .await?;
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Change the roster sort
///
/// PUT /settings/{session_id}/sort
pub async fn set_sort(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
    Json(sort): Json<SortState>,
) -> ApiResult<SettingsResponse> {
    let handle = state.settings().get(id)?;
    let mut session = handle.begin()?;
    session.set_sort(sort);
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Include or exclude one member
///
/// POST /settings/{session_id}/toggle
pub async fn toggle_member(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
    ValidatedJson(request): ValidatedJson<ToggleMemberRequest>,
) -> ApiResult<SettingsResponse> {
    let handle = state.settings().get(id)?;
    let mut session = handle.begin()?;
    session.toggle(&request.member_id, request.selected)?;
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// POST /settings/{session_id}/select-all
pub async fn select_all(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<SettingsResponse> {
    let handle = state.settings().get(id)?;
    let mut session = handle.begin()?;
    session.select_all();
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// POST /settings/{session_id}/deselect-all
pub async fn deselect_all(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<SettingsResponse> {
    let handle = state.settings().get(id)?;
    let mut session = handle.begin()?;
    session.deselect_all();
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Identity picker suggestions
///
/// POST /settings/{session_id}/suggestions
pub async fn suggest_identities(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
    OptionalValidatedJson(request): OptionalValidatedJson<SuggestIdentitiesRequest>,
) -> ApiResult<Json<SuggestionsResponse>> {
    let handle = state.settings().get(id)?;
    let session = handle.read().await?;
    let identities = SettingsService::new(state.service_context())
        .suggest_identities(&session, &request.query, &request.selected_ids)
        .await?;
    Ok(Json(SuggestionsResponse { identities }))
}

/// Add a member typed as free text or picked from the suggestions
///
/// POST /settings/{session_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> ApiResult<Created<SettingsResponse>> {
    let handle = state.settings().get(id)?;
    let mut session = handle.begin()?;

    let identity = match (request.identity, request.input.as_deref()) {
        (Some(identity), _) => identity,
        (None, Some(input)) => session
            .resolve_identity(input)
            .ok_or_else(|| ApiError::invalid_body("Input must not be blank"))?,
        (None, None) => return Err(ApiError::invalid_body("Either input or identity is required")),
    };
    session.add_member(&identity)?;
    Ok(Created(Json(SessionResponse::new(id, session.view()))))
}

/// Remove a custom member of the edited team
///
/// DELETE /settings/{session_id}/members/{member_id}
pub async fn remove_member(
    State(state): State<AppState>,
    Path((session_id, member_id)): Path<(String, String)>,
) -> ApiResult<SettingsResponse> {
    let id: Uuid = session_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid session_id format"))?;
    let handle = state.settings().get(id)?;
    let mut session = handle.begin()?;
    session.remove_custom_member(&member_id)?;
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Write the edited team's selection and custom members
///
/// POST /settings/{session_id}/save
pub async fn save(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<SettingsResponse> {
    let handle = state.settings().get(id)?;
    let mut session = handle.begin()?;
    SettingsService::new(state.service_context())
        .save(&mut session)
        .await?;
    Ok(Json(SessionResponse::new(id, session.view())))
}
