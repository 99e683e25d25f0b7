//! Team entity and panel configuration payload

use serde::{Deserialize, Serialize};

/// Team as listed by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }
}

/// Sort teams by name for display
pub fn sort_teams(teams: &mut [Team]) {
    teams.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.name.cmp(&b.name)));
}

/// Id/name pair in a configuration payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Typed configuration handed over when a panel opens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<NamedRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<NamedRef>,
}

impl PanelConfiguration {
    pub fn project_id(&self) -> Option<&str> {
        self.project.as_ref().and_then(|p| p.id.as_deref())
    }

    pub fn team_id(&self) -> Option<&str> {
        self.team.as_ref().and_then(|t| t.id.as_deref())
    }
}

/// Pick the initial team: host context team, then configured team, then the first listed
pub fn default_team_id(
    teams: &[Team],
    context_team: Option<&str>,
    configured_team: Option<&str>,
) -> Option<String> {
    let listed = |id: &str| teams.iter().any(|team| team.id == id);

    context_team
        .filter(|id| listed(id))
        .or_else(|| configured_team.filter(|id| listed(id)))
        .map(str::to_string)
        .or_else(|| teams.first().map(|team| team.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams() -> Vec<Team> {
        vec![Team::new("b", "Beta"), Team::new("a", "alpha")]
    }

    #[test]
    fn test_sort_teams() {
        let mut teams = teams();
        sort_teams(&mut teams);
        assert_eq!(teams[0].id, "a");
    }

    #[test]
    fn test_default_team_precedence() {
        let teams = teams();
        assert_eq!(default_team_id(&teams, Some("a"), Some("b")).as_deref(), Some("a"));
        assert_eq!(default_team_id(&teams, Some("zzz"), Some("b")).as_deref(), Some("b"));
        assert_eq!(default_team_id(&teams, None, Some("zzz")).as_deref(), Some("b"));
        assert_eq!(default_team_id(&[], Some("a"), None), None);
    }
}
