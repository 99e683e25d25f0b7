//! Settings editor - per-team inclusion lists and custom members
//!
//! Edits stay local until `save`, which merges them into the latest stored
//! blob. Saves are throttled to one per minimum interval.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use randomizer_core::{
    normalize_identity_token, stored_member_lists_equal, DomainError, IdentityKind, MemberSource,
    MemberView, PickerIdentity, PlatformIdentity, StoredMember, StoredMembersByTeam, Team,
};
use tracing::{debug, error, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::roster::{merge_roster, sort_members, RosterService, SortState};
use super::session::{Attached, BusyGuard, Liveness};
use super::status::{
    StatusMessage, MEMBER_ADDED, MEMBER_CONFLICT, MEMBER_EXISTS, MEMBER_REMOVED,
    PANEL_INIT_FAILURE, SAVE_FAILURE, SAVE_SUCCESS, SAVE_WAIT, TEAM_LOAD_ERROR,
    UNKNOWN_MEMBER_UPDATE,
};
use crate::dto::SettingsView;

/// Local matches offered for an empty picker query
const MAX_LOCAL_SUGGESTIONS: usize = 20;

type SaveLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

// ============================================================================
// Session State
// ============================================================================

/// State of one open settings editor
pub struct SettingsSession {
    project_id: String,
    teams: Vec<Team>,
    project_members: Vec<MemberView>,
    team_id: Option<String>,
    members: Vec<MemberView>,
    selected: BTreeSet<String>,
    custom_members: StoredMembersByTeam,
    persisted_selections: BTreeMap<String, Vec<String>>,
    persisted_custom: StoredMembersByTeam,
    baseline: BTreeMap<String, Vec<String>>,
    sort: SortState,
    status: Option<StatusMessage>,
    is_team_loading: bool,
    is_saving: bool,
    save_limiter: Option<SaveLimiter>,
    liveness: Liveness,
}

impl std::fmt::Debug for SettingsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsSession")
            .field("project_id", &self.project_id)
            .field("team_id", &self.team_id)
            .field("selected", &self.selected)
            .field("status", &self.status)
            .finish()
    }
}

impl Attached for SettingsSession {
    fn liveness(&self) -> &Liveness {
        &self.liveness
    }
}

impl SettingsSession {
    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    pub fn members(&self) -> &[MemberView] {
        &self.members
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn custom_members_for(&self, team_id: &str) -> &[StoredMember] {
        self.custom_members.get(team_id).map_or(&[], Vec::as_slice)
    }

    fn require_team(&self) -> ServiceResult<String> {
        self.team_id
            .clone()
            .ok_or_else(|| ServiceError::validation("No team selected"))
    }

    /// Sorted selected ids joined with `|`
    pub fn selection_fingerprint(&self) -> String {
        self.selected.iter().map(String::as_str).collect::<Vec<_>>().join("|")
    }

    /// Unsaved selection or custom member changes
    pub fn is_dirty(&self) -> bool {
        let Some(team_id) = self.team_id.as_deref() else {
            return false;
        };
        if self.is_team_loading {
            return false;
        }

        let baseline = self.baseline.get(team_id).map_or(String::new(), |ids| ids.join("|"));
        baseline != self.selection_fingerprint() || !self.edited_custom_teams().is_empty()
    }

    /// Teams whose local custom members differ from the stored ones
    fn edited_custom_teams(&self) -> Vec<String> {
        let teams: BTreeSet<&String> = self
            .custom_members
            .keys()
            .chain(self.persisted_custom.keys())
            .collect();
        teams
            .into_iter()
            .filter(|team| {
                let local = self.custom_members.get(*team).map_or(&[][..], Vec::as_slice);
                let stored = self.persisted_custom.get(*team).map_or(&[][..], Vec::as_slice);
                !stored_member_lists_equal(local, stored)
            })
            .cloned()
            .collect()
    }

    /// Known identities, first registration wins per lowercase id
    fn available_identities(&self) -> Vec<PickerIdentity> {
        let mut seen = HashSet::new();
        self.project_members
            .iter()
            .chain(self.members.iter())
            .map(PickerIdentity::from_member)
            .chain(
                self.custom_members
                    .values()
                    .flatten()
                    .map(PickerIdentity::from_stored),
            )
            .filter(|identity| seen.insert(identity.key()))
            .collect()
    }

    /// Known identity matching the input by name or mail, else a custom identity
    pub fn resolve_identity(&self, input: &str) -> Option<PickerIdentity> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        self.available_identities()
            .into_iter()
            .find(|identity| identity.matches_name_or_mail(input))
            .or_else(|| PickerIdentity::custom_from_input(input))
    }

    /// Directory identity that is already a platform member of the team
    fn conflicts_with_team_member(&self, identity: &PickerIdentity) -> bool {
        let id = normalize_identity_token(Some(&identity.entity_id));
        let origin = normalize_identity_token(identity.origin_id.as_deref());
        let mail = normalize_identity_token(identity.mail.as_deref());

        self.members
            .iter()
            .filter(|member| member.source == MemberSource::Team)
            .any(|member| {
                let member_id = normalize_identity_token(Some(&member.id));
                let unique = normalize_identity_token(member.unique_name.as_deref());
                member_id == id
                    || (!origin.is_empty() && member_id == origin)
                    || (!mail.is_empty() && unique == mail)
            })
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        sort_members(&mut self.members, sort);
    }

    /// Include or exclude a roster member
    pub fn toggle(&mut self, member_id: &str, selected: bool) -> ServiceResult<()> {
        if !self.members.iter().any(|m| m.id == member_id) {
            warn!(member_id = %member_id, "Toggle for a member not on the roster");
            self.status = Some(StatusMessage::error(UNKNOWN_MEMBER_UPDATE));
            return Err(DomainError::UnknownMember(member_id.to_string()).into());
        }
        self.status = None;
        if selected {
            self.selected.insert(member_id.to_string());
        } else {
            self.selected.remove(member_id);
        }
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.status = None;
        self.selected = self.members.iter().map(|m| m.id.clone()).collect();
    }

    pub fn deselect_all(&mut self) {
        self.status = None;
        self.selected.clear();
    }

    /// Add a picked or typed identity as a custom member of the current team
    pub fn add_member(&mut self, identity: &PickerIdentity) -> ServiceResult<MemberView> {
        let team_id = self.require_team()?;
        let entity_id = identity.entity_id.trim();
        let display_name = identity
            .display_name
            .as_deref()
            .or(identity.mail.as_deref())
            .map(str::trim)
            .unwrap_or("");
        if entity_id.is_empty() || display_name.is_empty() {
            return Err(DomainError::InvalidIdentity("identity needs an id and a name".to_string()).into());
        }
        if self.members.iter().any(|m| m.id.eq_ignore_ascii_case(entity_id)) {
            self.status = Some(StatusMessage::info(MEMBER_EXISTS));
            return Err(DomainError::MemberAlreadyExists(display_name.to_string()).into());
        }

        if identity.kind == IdentityKind::User && self.conflicts_with_team_member(identity) {
            self.status = Some(StatusMessage::info(MEMBER_CONFLICT));
            return Err(DomainError::MemberConflict(display_name.to_string()).into());
        }

        let has_persisted_selection = self.persisted_selections.contains_key(&team_id);
        let stored = StoredMember::from_identity(identity);
        let view = MemberView::from_stored(&stored);
        self.custom_members.entry(team_id.clone()).or_default().push(stored);
        self.members.push(view.clone());
        sort_members(&mut self.members, self.sort);
        if !has_persisted_selection {
            self.selected.insert(view.id.clone());
        }

        info!(team_id = %team_id, member_id = %view.id, source = %view.source, "Custom member added");
        self.status = Some(StatusMessage::info(MEMBER_ADDED));
        Ok(view)
    }

    /// Remove a custom member of the current team
    pub fn remove_custom_member(&mut self, member_id: &str) -> ServiceResult<()> {
        let team_id = self.require_team()?;
        let removed = self
            .custom_members
            .get_mut(&team_id)
            .and_then(|list| {
                let index = list.iter().position(|m| m.id() == member_id)?;
                Some(list.remove(index))
            });
        if removed.is_none() {
            self.status = Some(StatusMessage::error(UNKNOWN_MEMBER_UPDATE));
            return Err(DomainError::UnknownMember(member_id.to_string()).into());
        }

        self.members
            .retain(|m| m.id != member_id || m.source == MemberSource::Team);
        if !self.members.iter().any(|m| m.id == member_id) {
            self.selected.remove(member_id);
        }

        info!(team_id = %team_id, member_id = %member_id, "Custom member removed");
        self.status = Some(StatusMessage::info(MEMBER_REMOVED));
        Ok(())
    }

    /// Projection rendered by the editor
    pub fn view(&self) -> SettingsView {
        SettingsView {
            project_id: self.project_id.clone(),
            teams: self.teams.clone(),
            team_id: self.team_id.clone(),
            members: self.members.clone(),
            selected_ids: self.selected.iter().cloned().collect(),
            selection_fingerprint: self.selection_fingerprint(),
            sort: self.sort,
            is_dirty: self.is_dirty(),
            is_team_loading: self.is_team_loading,
            is_saving: self.is_saving,
            status: self.status.clone(),
        }
    }
}

fn picker_from_platform(identity: &PlatformIdentity) -> PickerIdentity {
    PickerIdentity {
        entity_id: identity.id.clone(),
        display_name: identity.display_name.clone(),
        mail: identity.unique_name.clone(),
        image_url: identity.image_url.clone(),
        origin_id: Some(identity.id.clone()),
        kind: IdentityKind::User,
    }
}

// ============================================================================
// Service
// ============================================================================

/// Settings service
pub struct SettingsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SettingsService<'a> {
    /// Create a new SettingsService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Open the editor with the stored settings and every project member
    #[instrument(skip(self))]
    pub async fn open(&self, project_id: &str, team_id: Option<&str>) -> ServiceResult<SettingsSession> {
        let roster = RosterService::new(self.ctx);
        let teams = roster
            .list_teams(project_id)
            .await
            .map_err(|_| ServiceError::roster_load(PANEL_INIT_FAILURE))?;
        let settings = self.ctx.gateway().load_settings().await.ok_or_else(|| {
            error!("Failed to load stored settings");
            ServiceError::roster_load(PANEL_INIT_FAILURE)
        })?;
        let project_members = roster.project_members(project_id, &teams).await;

        let custom_members = settings.custom_members.clone().unwrap_or_default();
        let mut session = SettingsSession {
            project_id: project_id.to_string(),
            teams,
            project_members,
            team_id: None,
            members: Vec::new(),
            selected: BTreeSet::new(),
            persisted_custom: custom_members.clone(),
            custom_members,
            persisted_selections: settings.selections(),
            baseline: BTreeMap::new(),
            sort: SortState::default(),
            status: None,
            is_team_loading: false,
            is_saving: false,
            save_limiter: Quota::with_period(self.ctx.save_min_interval()).map(RateLimiter::direct),
            liveness: Liveness::new(),
        };

        if let Some(team_id) = team_id {
            if let Err(e) = self.select_team(&mut session, team_id).await {
                warn!(team_id = %team_id, error = %e, "Settings opened without a team roster");
            }
        }
        info!(teams = session.teams.len(), "Settings editor opened");
        Ok(session)
    }

    /// Load a team's roster; the selection starts from the stored list or everyone
    #[instrument(skip(self, session))]
    pub async fn select_team(&self, session: &mut SettingsSession, team_id: &str) -> ServiceResult<()> {
        if !session.teams.iter().any(|team| team.id == team_id) {
            return Err(ServiceError::not_found("Team", team_id));
        }

        session.status = None;
        session.sort = SortState::default();
        session.team_id = Some(team_id.to_string());
        session.members.clear();
        session.selected.clear();
        session.is_team_loading = true;

        let expanded = RosterService::new(self.ctx)
            .expand_team_members(&session.project_id, team_id)
            .await;
        session.liveness.ensure_alive()?;
        session.is_team_loading = false;

        let platform = match expanded {
            Ok(platform) => platform,
            Err(e) => {
                error!(team_id = %team_id, error = %e, "Failed to load team roster");
                session.baseline.insert(team_id.to_string(), Vec::new());
                session.status = Some(StatusMessage::error(TEAM_LOAD_ERROR));
                return Err(e);
            }
        };

        session.members = merge_roster(&platform, session.custom_members_for(team_id), None);
        sort_members(&mut session.members, session.sort);

        let roster: HashSet<&str> = session.members.iter().map(|m| m.id.as_str()).collect();
        let selected: BTreeSet<String> = match session.persisted_selections.get(team_id) {
            Some(ids) => ids
                .iter()
                .filter(|id| roster.contains(id.as_str()))
                .cloned()
                .collect(),
            None => roster.iter().map(|id| (*id).to_string()).collect(),
        };
        session
            .baseline
            .insert(team_id.to_string(), selected.iter().cloned().collect());
        session.selected = selected;

        debug!(members = session.members.len(), selected = session.selected.len(), "Settings roster loaded");
        Ok(())
    }

    /// Free-text picker suggestions: the typed custom entry, directory
    /// matches, then known identities; already chosen ids are left out
    #[instrument(skip(self, session, selected_ids))]
    pub async fn suggest_identities(
        &self,
        session: &SettingsSession,
        query: &str,
        selected_ids: &[String],
    ) -> ServiceResult<Vec<PickerIdentity>> {
        let text = query.trim();
        let excluded: HashSet<String> = selected_ids.iter().map(|id| id.to_lowercase()).collect();
        let mut seen = HashSet::new();
        let mut suggestions = Vec::new();
        let mut offer = |identity: PickerIdentity| {
            let key = identity.key();
            if !excluded.contains(&key) && seen.insert(key) {
                suggestions.push(identity);
            }
        };

        if let Some(custom) = PickerIdentity::custom_from_input(text) {
            offer(custom);
        }

        if !text.is_empty() {
            match self.ctx.directory().search_identities(text).await {
                Ok(found) => found
                    .iter()
                    .filter(|identity| !identity.is_container)
                    .map(picker_from_platform)
                    .for_each(&mut offer),
                Err(e) => warn!(error = %e, "Identity search failed"),
            }
            session.liveness.ensure_alive()?;
        }

        let needle = text.to_lowercase();
        let local = session.available_identities().into_iter().filter(|identity| {
            needle.is_empty()
                || [identity.display_name.as_deref(), identity.mail.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|value| value.to_lowercase().contains(&needle))
        });
        if needle.is_empty() {
            local.take(MAX_LOCAL_SUGGESTIONS).for_each(&mut offer);
        } else {
            local.for_each(&mut offer);
        }

        Ok(suggestions)
    }

    /// Merge the team's selection and edited custom members into the latest blob
    #[instrument(skip(self, session), fields(team_id = ?session.team_id))]
    pub async fn save(&self, session: &mut SettingsSession) -> ServiceResult<()> {
        if let Some(limiter) = &session.save_limiter {
            if limiter.check().is_err() {
                session.status = Some(StatusMessage::info(SAVE_WAIT));
                return Err(ServiceError::Throttled);
            }
        }
        let team_id = session.require_team()?;

        let roster: HashSet<&str> = session.members.iter().map(|m| m.id.as_str()).collect();
        let selection: Vec<String> = session
            .selected
            .iter()
            .filter(|id| roster.contains(id.as_str()))
            .cloned()
            .collect();
        let mut edited: Vec<(String, Vec<StoredMember>)> = session
            .edited_custom_teams()
            .into_iter()
            .map(|team| {
                let members = session.custom_members.get(&team).cloned().unwrap_or_default();
                (team, members)
            })
            .collect();
        if !edited.iter().any(|(team, _)| *team == team_id) {
            edited.push((team_id.clone(), session.custom_members_for(&team_id).to_vec()));
        }

        let saving = BusyGuard::raise(&mut session.is_saving);
        let team = team_id.clone();
        let written_selection = selection.clone();
        let written = self
            .ctx
            .gateway()
            .modify_settings(move |latest| {
                edited
                    .into_iter()
                    .fold(latest.with_selection(&team, written_selection), |settings, (team, members)| {
                        settings.with_custom_members(&team, members)
                    })
            })
            .await;
        drop(saving);
        session.liveness.ensure_alive()?;

        match written {
            Some(settings) => {
                session.persisted_selections = settings.selections();
                session.custom_members = settings.custom_members.clone().unwrap_or_default();
                session.persisted_custom = session.custom_members.clone();
                session.baseline.insert(team_id.clone(), selection);
                session.status = Some(StatusMessage::success(SAVE_SUCCESS));
                info!(team_id = %team_id, "Settings saved");
                Ok(())
            }
            None => {
                error!(team_id = %team_id, "Failed to save settings");
                session.status = Some(StatusMessage::error(SAVE_FAILURE));
                Err(ServiceError::persistence_write(SAVE_FAILURE))
            }
        }
    }
}
