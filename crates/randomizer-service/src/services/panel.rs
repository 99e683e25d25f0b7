//! Panel service - the randomizer view for one team and one day
//!
//! Every action updates the session optimistically, then writes the shared
//! settings blob. A failed write rolls the selection back to its snapshot and
//! leaves an error status.

use randomizer_core::{
    default_team_id, holiday_options_for, AskedHistory, DayKey, HolidayDateKey, MemberView,
    QuestionOfDay, RandomSource, RandomizerDayData, RandomizerSettings, Team,
};
use tracing::{debug, error, info, instrument, warn};

use super::context::ServiceContext;
use super::daily_content::{select_next_holiday, select_next_question, DailyContentCache};
use super::error::{ServiceError, ServiceResult};
use super::roster::RosterService;
use super::selection::{RandomizeOutcome, SelectionSnapshot, SelectionState};
use super::session::{Attached, Liveness};
use super::status::{
    StatusMessage, CYCLE_COMPLETE, HOD_LOAD_ERROR, NO_HOLIDAYS, PANEL_INIT_FAILURE, QOD_LOAD_ERROR,
    RANDOMIZE_RECORD_ERROR, RANDOMIZE_RESET_ERROR, RANDOMIZE_REVERT_ERROR, TEAM_LOAD_ERROR,
};
use crate::dto::PanelView;

// ============================================================================
// Session State
// ============================================================================

/// State of one open panel
pub struct PanelSession {
    project_id: String,
    teams: Vec<Team>,
    team_id: Option<String>,
    day_key: DayKey,
    holiday_key: HolidayDateKey,
    selection: SelectionState,
    settings: Option<RandomizerSettings>,
    question: Option<QuestionOfDay>,
    holiday: Option<String>,
    status: Option<StatusMessage>,
    is_team_loading: bool,
    is_saving: bool,
    is_question_loading: bool,
    is_holiday_loading: bool,
    random: Box<dyn RandomSource>,
    content_cache: DailyContentCache,
    liveness: Liveness,
}

impl std::fmt::Debug for PanelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelSession")
            .field("project_id", &self.project_id)
            .field("team_id", &self.team_id)
            .field("day_key", &self.day_key)
            .field("selection", &self.selection)
            .field("status", &self.status)
            .finish()
    }
}

impl Attached for PanelSession {
    fn liveness(&self) -> &Liveness {
        &self.liveness
    }
}

impl PanelSession {
    fn new(ctx: &ServiceContext, project_id: &str, teams: Vec<Team>) -> Self {
        let today = ctx.today();
        Self {
            project_id: project_id.to_string(),
            teams,
            team_id: None,
            day_key: DayKey::for_date(today),
            holiday_key: HolidayDateKey::for_date(today),
            selection: SelectionState::default(),
            settings: None,
            question: None,
            holiday: None,
            status: None,
            is_team_loading: false,
            is_saving: false,
            is_question_loading: false,
            is_holiday_loading: false,
            random: ctx.random_source(),
            content_cache: DailyContentCache::new(),
            liveness: Liveness::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn question(&self) -> Option<&QuestionOfDay> {
        self.question.as_ref()
    }

    pub fn holiday(&self) -> Option<&str> {
        self.holiday.as_deref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Last settings blob read or written by this session
    pub fn settings(&self) -> Option<&RandomizerSettings> {
        self.settings.as_ref()
    }

    fn require_team(&self) -> ServiceResult<String> {
        self.team_id
            .clone()
            .ok_or_else(|| ServiceError::validation("No team selected"))
    }

    /// Projection rendered by the panel
    pub fn view(&self) -> PanelView {
        let selection = &self.selection;
        let busy = self.is_team_loading || self.is_saving;
        PanelView {
            project_id: self.project_id.clone(),
            teams: self.teams.clone(),
            team_id: self.team_id.clone(),
            day_key: self.day_key.to_string(),
            members: selection.members().to_vec(),
            completed_ids: selection.completed().to_vec(),
            history: selection.history().to_vec(),
            current_member: selection.current_member().cloned(),
            eligible_members: selection.eligible().into_iter().cloned().collect(),
            total_members: selection.members().len(),
            completed_count: selection.completed().len(),
            remaining_count: selection.remaining_count(),
            has_active_pending: selection.has_active_pending(),
            is_cycle_complete: selection.is_cycle_complete(),
            disable_randomize: busy || !selection.can_randomize(),
            disable_previous: busy || !selection.can_select_previous(),
            disable_reset: busy || !selection.can_reset(),
            question: self.question.clone(),
            holiday: self.holiday.clone(),
            is_team_loading: self.is_team_loading,
            is_saving: self.is_saving,
            is_question_loading: self.is_question_loading,
            is_holiday_loading: self.is_holiday_loading,
            status: self.status.clone(),
        }
    }
}

/// Optimistic selection change waiting for its write.
///
/// Holds the saving flag up while alive. Dropped without `confirm` or
/// `rollback`, the write was abandoned mid-flight and the snapshot is restored.
struct PendingProgress<'s> {
    session: &'s mut PanelSession,
    snapshot: Option<SelectionSnapshot>,
}

impl<'s> PendingProgress<'s> {
    fn begin(session: &'s mut PanelSession, snapshot: SelectionSnapshot) -> Self {
        session.is_saving = true;
        Self {
            session,
            snapshot: Some(snapshot),
        }
    }

    /// Keep the optimistic change
    fn confirm(mut self) {
        self.snapshot = None;
    }

    /// Restore the selection taken before the change
    fn rollback(mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.session.selection.restore(snapshot);
        }
    }
}

impl Drop for PendingProgress<'_> {
    fn drop(&mut self) {
        self.session.is_saving = false;
        if let Some(snapshot) = self.snapshot.take() {
            warn!(team_id = ?self.session.team_id, "Progress write abandoned, selection restored");
            self.session.selection.restore(snapshot);
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// Panel service
pub struct PanelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PanelService<'a> {
    /// Create a new PanelService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Open a panel on the default team.
    ///
    /// Fails only when the team list cannot be loaded; a failing team load
    /// leaves an error status on the returned session.
    #[instrument(skip(self))]
    pub async fn open(
        &self,
        project_id: &str,
        configured_team: Option<&str>,
        context_team: Option<&str>,
    ) -> ServiceResult<PanelSession> {
        let teams = RosterService::new(self.ctx)
            .list_teams(project_id)
            .await
            .map_err(|_| ServiceError::roster_load(PANEL_INIT_FAILURE))?;
        let initial_team = default_team_id(&teams, context_team, configured_team);
        let mut session = PanelSession::new(self.ctx, project_id, teams);

        if let Some(team_id) = initial_team {
            if let Err(e) = self.select_team(&mut session, &team_id).await {
                warn!(team_id = %team_id, error = %e, "Panel opened without a team roster");
            }
        }

        info!(day_key = %session.day_key, team_id = ?session.team_id, "Panel opened");
        Ok(session)
    }

    /// Show another team, then fill in today's question and holiday
    #[instrument(skip(self, session))]
    pub async fn select_team(&self, session: &mut PanelSession, team_id: &str) -> ServiceResult<()> {
        if !session.teams.iter().any(|team| team.id == team_id) {
            return Err(ServiceError::not_found("Team", team_id));
        }
        if session.team_id.as_deref() == Some(team_id) && !session.selection.members().is_empty() {
            return Ok(());
        }

        session.status = None;
        self.load_team(session, team_id).await?;
        self.prime_daily_content(session).await;
        Ok(())
    }

    async fn load_team(&self, session: &mut PanelSession, team_id: &str) -> ServiceResult<()> {
        session.team_id = Some(team_id.to_string());
        session.selection = SelectionState::default();
        session.is_team_loading = true;

        let loaded = self.fetch_team_state(&session.project_id, team_id).await;
        session.liveness.ensure_alive()?;
        session.is_team_loading = false;

        match loaded {
            Ok((settings, members)) => {
                let day = settings.day(session.day_key.as_str());
                session.selection = SelectionState::load(members, day, team_id);
                if let Some(question) = day.and_then(RandomizerDayData::question) {
                    session.question = Some(question);
                }
                if let Some(holiday) = day.and_then(RandomizerDayData::holiday) {
                    session.holiday = Some(holiday);
                }
                session.settings = Some(settings);
                info!(
                    team_id = %team_id,
                    members = session.selection.members().len(),
                    completed = session.selection.completed().len(),
                    "Team roster loaded"
                );
                Ok(())
            }
            Err(e) => {
                error!(team_id = %team_id, error = %e, "Failed to load team roster");
                session.status = Some(StatusMessage::error(TEAM_LOAD_ERROR));
                Err(e)
            }
        }
    }

    async fn fetch_team_state(
        &self,
        project_id: &str,
        team_id: &str,
    ) -> ServiceResult<(RandomizerSettings, Vec<MemberView>)> {
        let settings = self
            .ctx
            .gateway()
            .load_settings()
            .await
            .ok_or_else(|| ServiceError::roster_load("settings unavailable"))?;
        let members = RosterService::new(self.ctx)
            .load_roster(project_id, team_id, &settings, true)
            .await?;
        Ok((settings, members))
    }

    // === Selection cycle ===

    /// Complete the pending member and pick the next one
    #[instrument(skip(self, session), fields(team_id = ?session.team_id))]
    pub async fn randomize(&self, session: &mut PanelSession) -> ServiceResult<RandomizeOutcome> {
        let team_id = session.require_team()?;
        session.status = None;

        let snapshot = session.selection.snapshot();
        let outcome = match session.selection.randomize(session.random.as_mut()) {
            Ok(outcome) => outcome,
            Err(e) => {
                session.status = Some(StatusMessage::info(CYCLE_COMPLETE));
                return Err(e.into());
            }
        };

        self.commit_progress(session, &team_id, snapshot, RANDOMIZE_RECORD_ERROR)
            .await?;
        info!(outcome = ?outcome, "Member randomized");
        Ok(outcome)
    }

    /// Step back to the previously picked member
    #[instrument(skip(self, session), fields(team_id = ?session.team_id))]
    pub async fn select_previous(&self, session: &mut PanelSession) -> ServiceResult<()> {
        let team_id = session.require_team()?;
        session.status = None;

        let snapshot = session.selection.snapshot();
        let active = session.selection.select_previous()?;

        self.commit_progress(session, &team_id, snapshot, RANDOMIZE_REVERT_ERROR)
            .await?;
        info!(active = ?active, "Reverted to previous member");
        Ok(())
    }

    /// Clear today's progress for the team
    #[instrument(skip(self, session), fields(team_id = ?session.team_id))]
    pub async fn reset(&self, session: &mut PanelSession) -> ServiceResult<()> {
        let team_id = session.require_team()?;
        session.status = None;

        let snapshot = session.selection.snapshot();
        if !session.selection.reset() {
            debug!("Nothing to reset");
            return Ok(());
        }

        self.commit_progress(session, &team_id, snapshot, RANDOMIZE_RESET_ERROR)
            .await?;
        info!("Selections reset");
        Ok(())
    }

    /// Write the team's progress into today's record, rolling back on failure
    async fn commit_progress(
        &self,
        session: &mut PanelSession,
        team_id: &str,
        snapshot: SelectionSnapshot,
        failure: &'static str,
    ) -> ServiceResult<()> {
        let day_key = session.day_key.clone();
        let team = team_id.to_string();
        let completed = session.selection.completed().to_vec();
        let active = session
            .selection
            .has_active_pending()
            .then(|| session.selection.active().map(str::to_string))
            .flatten();

        let pending = PendingProgress::begin(session, snapshot);
        let written = self
            .ctx
            .gateway()
            .modify_settings(move |settings| {
                settings.update_day(day_key.as_str(), |day| {
                    day.with_team_progress(&team, completed, active)
                })
            })
            .await;
        pending.session.liveness.ensure_alive()?;

        match written {
            Some(settings) => {
                pending.session.settings = Some(settings);
                pending.confirm();
                Ok(())
            }
            None => {
                error!(team_id = %team_id, "Failed to persist selection progress");
                pending.session.status = Some(StatusMessage::error(failure));
                pending.rollback();
                Err(ServiceError::persistence_write(failure))
            }
        }
    }

    // === Daily content ===

    /// Fill in whichever of question and holiday is still missing
    pub async fn prime_daily_content(&self, session: &mut PanelSession) {
        if session.question.is_none() {
            if let Err(e) = self.load_question(session).await {
                debug!(error = %e, "Question of the day not primed");
            }
        }
        if session.holiday.is_none() {
            if let Err(e) = self.load_holiday(session).await {
                debug!(error = %e, "Holiday of the day not primed");
            }
        }
    }

    /// Pick and store a new question of the day
    #[instrument(skip(self, session))]
    pub async fn refresh_question(&self, session: &mut PanelSession) -> ServiceResult<()> {
        session.status = None;
        self.load_question(session).await
    }

    /// Pick and store a new holiday of the day
    #[instrument(skip(self, session))]
    pub async fn refresh_holiday(&self, session: &mut PanelSession) -> ServiceResult<()> {
        session.status = None;
        self.load_holiday(session).await
    }

    async fn load_question(&self, session: &mut PanelSession) -> ServiceResult<()> {
        session.is_question_loading = true;
        let result = self.rotate_question(session).await;
        session.is_question_loading = false;

        if let Err(e) = &result {
            if !matches!(e, ServiceError::Detached) {
                error!(error = %e, "Failed to refresh question of the day");
                session.status = Some(StatusMessage::error(QOD_LOAD_ERROR));
            }
        }
        result
    }

    async fn rotate_question(&self, session: &mut PanelSession) -> ServiceResult<()> {
        let questions = session.content_cache.questions(self.ctx.content()).await?;
        session.liveness.ensure_alive()?;

        let latest = self
            .ctx
            .gateway()
            .load_settings()
            .await
            .ok_or_else(|| ServiceError::content_load("settings unavailable"))?;
        session.liveness.ensure_alive()?;

        let current = latest
            .day(session.day_key.as_str())
            .and_then(RandomizerDayData::question)
            .or_else(|| session.question.clone());
        let history = AskedHistory::collect(&latest);
        let next = select_next_question(
            questions,
            &history,
            current.as_ref(),
            session.random.as_mut(),
        )?;

        let updated = latest.update_day(session.day_key.as_str(), |day| day.with_question(&next));
        if !self.ctx.gateway().save_settings(&updated).await {
            return Err(ServiceError::persistence_write("question not stored"));
        }
        session.liveness.ensure_alive()?;

        info!(question_id = ?next.id, "Question of the day updated");
        session.question = Some(next);
        session.settings = Some(updated);
        Ok(())
    }

    async fn load_holiday(&self, session: &mut PanelSession) -> ServiceResult<()> {
        session.is_holiday_loading = true;
        let result = self.rotate_holiday(session).await;
        session.is_holiday_loading = false;

        if let Err(e) = &result {
            if !matches!(e, ServiceError::Detached) {
                error!(error = %e, "Failed to refresh holiday of the day");
                session.status = Some(StatusMessage::error(HOD_LOAD_ERROR));
            }
        }
        result
    }

    async fn rotate_holiday(&self, session: &mut PanelSession) -> ServiceResult<()> {
        let dataset = session.content_cache.holidays(self.ctx.content()).await?;
        session.liveness.ensure_alive()?;

        let options = holiday_options_for(dataset, session.holiday_key.as_str());
        if options.is_empty() {
            debug!(date = %session.holiday_key, "No holidays listed for today");
            session.holiday = Some(NO_HOLIDAYS.to_string());
            return Ok(());
        }

        let latest = self
            .ctx
            .gateway()
            .load_settings()
            .await
            .ok_or_else(|| ServiceError::content_load("settings unavailable"))?;
        session.liveness.ensure_alive()?;

        let current = latest
            .day(session.day_key.as_str())
            .and_then(RandomizerDayData::holiday)
            .or_else(|| session.holiday.clone());
        let next = select_next_holiday(&options, current.as_deref(), session.random.as_mut())?;

        let updated = latest.update_day(session.day_key.as_str(), |day| day.with_holiday(&next));
        if !self.ctx.gateway().save_settings(&updated).await {
            return Err(ServiceError::persistence_write("holiday not stored"));
        }
        session.liveness.ensure_alive()?;

        info!(holiday = %next, "Holiday of the day updated");
        session.holiday = Some(next);
        session.settings = Some(updated);
        Ok(())
    }
}
