//! Roster service - team listing, container expansion and roster merge

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use randomizer_core::{
    sort_teams, MemberView, RandomizerSettings, RepoResult, StoredMember, Team, TeamMember,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

// ============================================================================
// Merge and sort
// ============================================================================

/// Merge platform members with stored custom members.
///
/// Entries are deduplicated by id and the higher-precedence source keeps the
/// whole record; equal sources keep the first one seen. A non-empty
/// `inclusion` list restricts the result to those ids.
pub fn merge_roster(
    platform: &[TeamMember],
    custom: &[StoredMember],
    inclusion: Option<&[String]>,
) -> Vec<MemberView> {
    let candidates = platform
        .iter()
        .map(MemberView::from_team_member)
        .chain(custom.iter().map(MemberView::from_stored));

    let mut merged: Vec<MemberView> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    for candidate in candidates {
        match index_by_id.get(&candidate.id) {
            Some(&index) => {
                if candidate.source.outranks(merged[index].source) {
                    merged[index] = candidate;
                }
            }
            None => {
                index_by_id.insert(candidate.id.clone(), merged.len());
                merged.push(candidate);
            }
        }
    }

    if let Some(ids) = inclusion.filter(|ids| !ids.is_empty()) {
        let included: HashSet<&str> = ids.iter().map(String::as_str).collect();
        merged.retain(|member| included.contains(member.id.as_str()));
    }

    merged.sort_by(MemberView::compare_by_name);
    merged
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    #[default]
    Member,
    Source,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Column and direction of a roster table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

pub fn sort_members(members: &mut [MemberView], sort: SortState) {
    members.sort_by(|a, b| {
        let ordering = match sort.column {
            SortColumn::Member => a.compare_by_name(b),
            SortColumn::Source => a.compare_by_source(b),
        };
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Split one membership listing into users and containers still to visit
fn partition_members(
    members: Vec<TeamMember>,
    visited: &mut HashSet<String>,
    seen_users: &mut HashSet<String>,
    users: &mut Vec<TeamMember>,
) -> Vec<String> {
    let mut containers = Vec::new();
    for member in members {
        let identity = &member.identity;
        if identity.is_directory_group() {
            debug!(id = %identity.id, "Skipping directory group");
            continue;
        }
        if identity.is_container {
            if visited.insert(identity.id.clone()) {
                containers.push(identity.id.clone());
            }
        } else if seen_users.insert(identity.id.clone()) {
            users.push(member);
        }
    }
    containers
}

// ============================================================================
// Service
// ============================================================================

/// Roster service
pub struct RosterService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RosterService<'a> {
    /// Create a new RosterService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Teams of a project, sorted by name
    #[instrument(skip(self))]
    pub async fn list_teams(&self, project_id: &str) -> ServiceResult<Vec<Team>> {
        let mut teams = self.ctx.directory().list_teams(project_id).await.map_err(|e| {
            error!(error = %e, "Failed to list teams");
            ServiceError::roster_load(e.to_string())
        })?;
        sort_teams(&mut teams);
        Ok(teams)
    }

    /// Every user reachable from a team, expanding nested containers once each.
    ///
    /// A failing root listing is an error; failing sub-containers contribute
    /// no members.
    #[instrument(skip(self))]
    pub async fn expand_team_members(
        &self,
        project_id: &str,
        team_id: &str,
    ) -> ServiceResult<Vec<TeamMember>> {
        let root = self.fetch_all_pages(project_id, team_id).await.map_err(|e| {
            error!(error = %e, "Failed to load team members");
            ServiceError::roster_load(e.to_string())
        })?;

        let mut visited = HashSet::from([team_id.to_string()]);
        let mut seen_users = HashSet::new();
        let mut users = Vec::new();
        let mut frontier = partition_members(root, &mut visited, &mut seen_users, &mut users);

        while !frontier.is_empty() {
            let listings = join_all(
                frontier
                    .iter()
                    .map(|container_id| self.fetch_all_pages(project_id, container_id)),
            )
            .await;

            let mut next = Vec::new();
            for (container_id, listing) in frontier.iter().zip(listings) {
                match listing {
                    Ok(members) => next.extend(partition_members(
                        members,
                        &mut visited,
                        &mut seen_users,
                        &mut users,
                    )),
                    Err(e) => {
                        warn!(container_id = %container_id, error = %e, "Skipping unreadable sub-team");
                    }
                }
            }
            frontier = next;
        }

        debug!(count = users.len(), "Expanded team members");
        Ok(users)
    }

    /// Roster of a team merged with its stored custom members
    pub async fn load_roster(
        &self,
        project_id: &str,
        team_id: &str,
        settings: &RandomizerSettings,
        apply_selection: bool,
    ) -> ServiceResult<Vec<MemberView>> {
        let platform = self.expand_team_members(project_id, team_id).await?;
        let custom = settings.custom_members_for(team_id);
        let inclusion = if apply_selection {
            settings.selection_for(team_id)
        } else {
            None
        };
        Ok(merge_roster(&platform, &custom, inclusion.as_deref()))
    }

    /// Union of every team's members, deduplicated by id.
    ///
    /// Teams that fail to load are skipped.
    #[instrument(skip(self, teams))]
    pub async fn project_members(&self, project_id: &str, teams: &[Team]) -> Vec<MemberView> {
        let expansions = join_all(
            teams
                .iter()
                .map(|team| self.expand_team_members(project_id, &team.id)),
        )
        .await;

        let mut seen = HashSet::new();
        let mut members: Vec<MemberView> = Vec::new();
        for (team, expansion) in teams.iter().zip(expansions) {
            match expansion {
                Ok(team_members) => {
                    for member in &team_members {
                        if seen.insert(member.identity.id.clone()) {
                            members.push(MemberView::from_team_member(member));
                        }
                    }
                }
                Err(e) => warn!(team_id = %team.id, error = %e, "Skipping team in project members"),
            }
        }

        members.sort_by(MemberView::compare_by_name);
        info!(count = members.len(), "Aggregated project members");
        members
    }

    async fn fetch_all_pages(&self, project_id: &str, team_id: &str) -> RepoResult<Vec<TeamMember>> {
        let top = self.ctx.page_size();
        let mut skip = 0;
        let mut members = Vec::new();
        loop {
            let page = self
                .ctx
                .directory()
                .team_members(project_id, team_id, top, skip)
                .await?;
            let len = page.len();
            members.extend(page);
            // A page longer than requested means the platform ignored paging
            if len != top {
                break;
            }
            skip += len;
        }
        Ok(members)
    }
}
