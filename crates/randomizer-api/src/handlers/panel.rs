//! Randomizer panel handlers
//!
//! A panel is opened once, then driven through its session id. Actions take
//! the session exclusively; a second action while one is in flight gets 409.

use axum::{extract::State, Json};
use randomizer_core::DomainError;
use randomizer_service::dto::{OpenPanelRequest, PanelView, SelectTeamRequest, SessionResponse};
use randomizer_service::{PanelService, ServiceError, SessionHandle};
use tracing::info;

use crate::extractors::{SessionIdPath, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

type PanelResponse = Json<SessionResponse<PanelView>>;

/// Open a panel on the default team
///
/// POST /panels
pub async fn open_panel(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<OpenPanelRequest>,
) -> ApiResult<Created<PanelResponse>> {
    let project_id = request
        .resolved_project_id()
        .ok_or_else(|| ApiError::invalid_body("A project id is required"))?;

    let session = PanelService::new(state.service_context())
        .open(
            project_id,
            request.configured_team_id(),
            request.context_team_id.as_deref(),
        )
        .await?;
    let view = session.view();
    let id = state.panels().insert(SessionHandle::new(session));

    info!(session_id = %id, "Panel session registered");
    Ok(Created(Json(SessionResponse::new(id, view))))
}

/// Current panel view
///
/// GET /panels/{session_id}
pub async fn get_panel(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<PanelResponse> {
    let handle = state.panels().get(id)?;
    let session = handle.read().await?;
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Close a panel; pending actions discard their results
///
/// DELETE /panels/{session_id}
pub async fn close_panel(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<NoContent> {
    state.panels().close(id)?;
    Ok(NoContent)
}

/// Switch team
///
/// PUT /panels/{session_id}/team
pub async fn select_team(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
    ValidatedJson(request): ValidatedJson<SelectTeamRequest>,
) -> ApiResult<PanelResponse> {
    let handle = state.panels().get(id)?;
    let mut session = handle.begin()?;
    PanelService::new(state.service_context())
        .select_team(&mut session, &request.team_id)
        .await?;
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Pick the next member
///
/// POST /panels/{session_id}/randomize
pub async fn randomize(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<PanelResponse> {
    let handle = state.panels().get(id)?;
    let mut session = handle.begin()?;
    match PanelService::new(state.service_context())
        .randomize(&mut session)
        .await
    {
        // Cycle complete: the view carries the status
        Ok(_) | Err(ServiceError::Domain(DomainError::NoCandidates)) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Undo the last pick
///
/// POST /panels/{session_id}/previous
pub async fn select_previous(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<PanelResponse> {
    let handle = state.panels().get(id)?;
    let mut session = handle.begin()?;
    PanelService::new(state.service_context())
        .select_previous(&mut session)
        .await?;
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Start today's cycle over
///
/// POST /panels/{session_id}/reset
pub async fn reset(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<PanelResponse> {
    let handle = state.panels().get(id)?;
    let mut session = handle.begin()?;
    PanelService::new(state.service_context())
        .reset(&mut session)
        .await?;
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Rotate the question of the day
///
/// POST /panels/{session_id}/question
pub async fn refresh_question(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<PanelResponse> {
    let handle = state.panels().get(id)?;
    let mut session = handle.begin()?;
    PanelService::new(state.service_context())
        .refresh_question(&mut session)
        .await?;
    Ok(Json(SessionResponse::new(id, session.view())))
}

/// Rotate the holiday of the day
///
/// POST /panels/{session_id}/holiday
pub async fn refresh_holiday(
    State(state): State<AppState>,
    SessionIdPath(id): SessionIdPath,
) -> ApiResult<PanelResponse> {
    let handle = state.panels().get(id)?;
    let mut session = handle.begin()?;
    PanelService::new(state.service_context())
        .refresh_holiday(&mut session)
        .await?;
    Ok(Json(SessionResponse::new(id, session.view())))
}
