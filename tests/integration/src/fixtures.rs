//! Test fixtures and platform fakes
//!
//! Provides a scripted team directory, static daily content and the
//! datasets the scenarios share.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use randomizer_core::{
    ContentSource, DomainError, PlatformIdentity, RepoResult, Team, TeamDirectory, TeamMember,
};
use serde_json::{json, Value};

/// Fixed calendar day of every scenario
pub fn scenario_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap_or_default()
}

/// Day key of `scenario_date`
pub const SCENARIO_DAY_KEY: &str = "10162026";

pub fn identity(id: &str, name: &str) -> PlatformIdentity {
    PlatformIdentity {
        id: id.to_string(),
        display_name: Some(name.to_string()),
        unique_name: Some(format!("{}@example.com", name.to_lowercase())),
        image_url: None,
        is_container: false,
        descriptor: Some(format!("aad.{id}")),
    }
}

pub fn user(id: &str, name: &str) -> TeamMember {
    TeamMember::new(identity(id, name))
}

pub fn group(id: &str, name: &str) -> TeamMember {
    TeamMember::new(PlatformIdentity {
        id: id.to_string(),
        display_name: Some(name.to_string()),
        unique_name: None,
        image_url: None,
        is_container: true,
        descriptor: Some(format!("vssgp.{id}")),
    })
}

/// In-process directory with fixed teams and memberships
#[derive(Debug, Default)]
pub struct FakeDirectory {
    teams: Vec<Team>,
    members: HashMap<String, Vec<TeamMember>>,
    people: Vec<PlatformIdentity>,
    offline: AtomicBool,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two teams: Platform (Ann, Ben and the nested Core group with Cat)
    /// and Design (Dan)
    pub fn standard() -> Self {
        Self::new()
            .with_team(
                "team-platform",
                "Platform",
                vec![user("u-ann", "Ann"), user("u-ben", "Ben"), group("g-core", "Core")],
            )
            .with_group("g-core", vec![user("u-cat", "Cat"), user("u-ann", "Ann")])
            .with_team("team-design", "Design", vec![user("u-dan", "Dan")])
            .with_people(vec![identity("u-eve", "Eve"), identity("u-ben", "Ben")])
    }

    pub fn with_team(mut self, id: &str, name: &str, members: Vec<TeamMember>) -> Self {
        self.teams.push(Team::new(id, name));
        self.members.insert(id.to_string(), members);
        self
    }

    pub fn with_group(mut self, id: &str, members: Vec<TeamMember>) -> Self {
        self.members.insert(id.to_string(), members);
        self
    }

    /// Identities found by search
    pub fn with_people(mut self, people: Vec<PlatformIdentity>) -> Self {
        self.people = people;
        self
    }

    /// Make every call fail
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> RepoResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DomainError::Directory("directory offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TeamDirectory for FakeDirectory {
    async fn list_teams(&self, _project_id: &str) -> RepoResult<Vec<Team>> {
        self.check_online()?;
        Ok(self.teams.clone())
    }

    async fn team_members(
        &self,
        _project_id: &str,
        team_id: &str,
        top: usize,
        skip: usize,
    ) -> RepoResult<Vec<TeamMember>> {
        self.check_online()?;
        let members = self.members.get(team_id).cloned().unwrap_or_default();
        Ok(members.into_iter().skip(skip).take(top).collect())
    }

    async fn search_identities(&self, query: &str) -> RepoResult<Vec<PlatformIdentity>> {
        self.check_online()?;
        let needle = query.to_lowercase();
        Ok(self
            .people
            .iter()
            .filter(|person| {
                person
                    .display_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}

/// Static question and holiday documents
#[derive(Debug, Default)]
pub struct FakeContent {
    questions: Value,
    holidays: Value,
    offline: AtomicBool,
}

impl FakeContent {
    pub fn new(questions: Value, holidays: Value) -> Self {
        Self {
            questions,
            holidays,
            offline: AtomicBool::new(false),
        }
    }

    /// Three questions and two holidays for `scenario_date`
    pub fn standard() -> Self {
        Self::new(
            json!([
                { "id": 1, "text": "Favourite snack?" },
                { "id": 2, "text": "Best trip so far?" },
                "  What are you reading?  "
            ]),
            json!([
                { "date": "October 16", "holidays": ["World Food Day", { "title": "Boss's Day", "description": "Thank a manager" }] },
                { "date": "October 17", "holidays": ["Tomorrow Day"] }
            ]),
        )
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> RepoResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DomainError::Content("content offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentSource for FakeContent {
    async fn fetch_questions(&self) -> RepoResult<Value> {
        self.check_online()?;
        Ok(self.questions.clone())
    }

    async fn fetch_holidays(&self) -> RepoResult<Value> {
        self.check_online()?;
        Ok(self.holidays.clone())
    }
}
