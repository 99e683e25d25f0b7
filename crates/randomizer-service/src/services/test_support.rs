//! Scripted ports shared by the service unit tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use randomizer_core::{
    ContentSource, DomainError, PlatformIdentity, RandomSource, RepoResult, SequenceRandom, Team,
    TeamDirectory, TeamMember,
};
use randomizer_store::{MemoryKeyValueStore, PersistenceGateway};
use serde_json::Value;

use super::context::{ServiceContext, ServiceContextBuilder};

pub fn user(id: &str, name: &str) -> TeamMember {
    TeamMember::new(PlatformIdentity {
        id: id.to_string(),
        display_name: Some(name.to_string()),
        unique_name: Some(format!("{}@example.com", name.to_lowercase())),
        image_url: None,
        is_container: false,
        descriptor: Some(format!("aad.{id}")),
    })
}

pub fn container(id: &str, name: &str) -> TeamMember {
    TeamMember::new(PlatformIdentity {
        id: id.to_string(),
        display_name: Some(name.to_string()),
        unique_name: None,
        image_url: None,
        is_container: true,
        descriptor: Some(format!("vssgp.{id}")),
    })
}

pub fn directory_group(id: &str) -> TeamMember {
    TeamMember::new(PlatformIdentity {
        id: id.to_string(),
        display_name: Some("Directory group".to_string()),
        unique_name: None,
        image_url: None,
        is_container: true,
        descriptor: Some(format!("aadgp.{id}")),
    })
}

#[derive(Default)]
pub struct ScriptedDirectory {
    teams: Vec<Team>,
    members: HashMap<String, Vec<TeamMember>>,
    failing: HashSet<String>,
    search_results: Vec<PlatformIdentity>,
    fail_teams: AtomicBool,
    fail_search: AtomicBool,
    member_calls: AtomicUsize,
}

impl ScriptedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, id: &str, name: &str, members: Vec<TeamMember>) -> Self {
        self.teams.push(Team::new(id, name));
        self.members.insert(id.to_string(), members);
        self
    }

    /// Membership of a nested container
    pub fn with_group(mut self, id: &str, members: Vec<TeamMember>) -> Self {
        self.members.insert(id.to_string(), members);
        self
    }

    pub fn failing_members(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn with_search_results(mut self, results: Vec<PlatformIdentity>) -> Self {
        self.search_results = results;
        self
    }

    pub fn set_fail_teams(&self, fail: bool) {
        self.fail_teams.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    pub fn member_calls(&self) -> usize {
        self.member_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TeamDirectory for ScriptedDirectory {
    async fn list_teams(&self, _project_id: &str) -> RepoResult<Vec<Team>> {
        if self.fail_teams.load(Ordering::SeqCst) {
            return Err(DomainError::Directory("teams unavailable".to_string()));
        }
        Ok(self.teams.clone())
    }

    async fn team_members(
        &self,
        _project_id: &str,
        team_id: &str,
        top: usize,
        skip: usize,
    ) -> RepoResult<Vec<TeamMember>> {
        self.member_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(team_id) {
            return Err(DomainError::Directory(format!("{team_id} unavailable")));
        }
        let all = self.members.get(team_id).cloned().unwrap_or_default();
        Ok(all.into_iter().skip(skip).take(top).collect())
    }

    async fn search_identities(&self, query: &str) -> RepoResult<Vec<PlatformIdentity>> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(DomainError::Directory("search unavailable".to_string()));
        }
        let needle = query.to_lowercase();
        Ok(self
            .search_results
            .iter()
            .filter(|identity| {
                identity
                    .display_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct ScriptedContent {
    pub questions: Value,
    pub holidays: Value,
    fail_questions: AtomicBool,
    fail_holidays: AtomicBool,
    question_fetches: AtomicUsize,
    holiday_fetches: AtomicUsize,
}

impl ScriptedContent {
    pub fn new(questions: Value, holidays: Value) -> Self {
        Self {
            questions,
            holidays,
            ..Self::default()
        }
    }

    pub fn set_fail_questions(&self, fail: bool) {
        self.fail_questions.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_holidays(&self, fail: bool) {
        self.fail_holidays.store(fail, Ordering::SeqCst);
    }

    pub fn question_fetches(&self) -> usize {
        self.question_fetches.load(Ordering::SeqCst)
    }

    pub fn holiday_fetches(&self) -> usize {
        self.holiday_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for ScriptedContent {
    async fn fetch_questions(&self) -> RepoResult<Value> {
        self.question_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_questions.load(Ordering::SeqCst) {
            return Err(DomainError::Content("questions unavailable".to_string()));
        }
        Ok(self.questions.clone())
    }

    async fn fetch_holidays(&self) -> RepoResult<Value> {
        self.holiday_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_holidays.load(Ordering::SeqCst) {
            return Err(DomainError::Content("holidays unavailable".to_string()));
        }
        Ok(self.holidays.clone())
    }
}

/// 2026-10-16: day key `10162026`, holiday key `October 16`
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

pub struct Harness {
    pub store: Arc<MemoryKeyValueStore>,
    pub directory: Arc<ScriptedDirectory>,
    pub content: Arc<ScriptedContent>,
    pub ctx: ServiceContext,
}

/// Context over scripted ports with a cycling random sequence
pub fn harness(
    directory: ScriptedDirectory,
    content: ScriptedContent,
    randoms: Vec<f64>,
) -> Harness {
    let store = Arc::new(MemoryKeyValueStore::new());
    let directory = Arc::new(directory);
    let content = Arc::new(content);

    let ctx = ServiceContextBuilder::new()
        .gateway(PersistenceGateway::new(store.clone()))
        .directory(directory.clone())
        .content(content.clone())
        .random_factory(Arc::new(move || {
            Box::new(SequenceRandom::new(randoms.clone())) as Box<dyn RandomSource>
        }))
        .page_size(2)
        .save_min_interval(std::time::Duration::ZERO)
        .fixed_date(test_date())
        .build()
        .unwrap();

    Harness {
        store,
        directory,
        content,
        ctx,
    }
}
