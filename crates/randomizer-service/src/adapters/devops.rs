//! Team directory backed by the platform REST API

use async_trait::async_trait;
use randomizer_common::DevOpsConfig;
use randomizer_core::{DomainError, PlatformIdentity, RepoResult, Team, TeamDirectory, TeamMember};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::REQUEST_TIMEOUT;

/// `{ "count": n, "value": [...] }` envelope used by every listing
#[derive(Debug, Deserialize)]
struct ValueList<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRecord {
    id: String,
    #[serde(default)]
    provider_display_name: Option<String>,
    #[serde(default)]
    custom_display_name: Option<String>,
    #[serde(default)]
    is_container: bool,
    #[serde(default)]
    descriptor: Option<String>,
    #[serde(default)]
    properties: IdentityProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct IdentityProperties {
    #[serde(default)]
    mail: Option<PropertyValue>,
    #[serde(default)]
    account: Option<PropertyValue>,
}

#[derive(Debug, Deserialize)]
struct PropertyValue {
    #[serde(rename = "$value")]
    value: Option<String>,
}

impl From<IdentityRecord> for PlatformIdentity {
    fn from(record: IdentityRecord) -> Self {
        let mail = record
            .properties
            .mail
            .and_then(|p| p.value)
            .or_else(|| record.properties.account.and_then(|p| p.value))
            .filter(|mail| !mail.is_empty());
        Self {
            id: record.id,
            display_name: record.custom_display_name.or(record.provider_display_name),
            unique_name: mail,
            image_url: None,
            is_container: record.is_container,
            descriptor: record.descriptor,
        }
    }
}

/// REST client for teams, team memberships and identity search
#[derive(Debug, Clone)]
pub struct RestTeamDirectory {
    client: reqwest::Client,
    org_url: String,
    pat: Option<String>,
    api_version: String,
}

impl RestTeamDirectory {
    /// Build a client for the configured organization
    pub fn new(config: &DevOpsConfig) -> RepoResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Directory(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            client,
            org_url: config.org_url.trim_end_matches('/').to_string(),
            pat: config.pat.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn teams_url(&self, project_id: &str) -> String {
        format!("{}/_apis/projects/{project_id}/teams", self.org_url)
    }

    fn members_url(&self, project_id: &str, team_id: &str) -> String {
        format!(
            "{}/_apis/projects/{project_id}/teams/{team_id}/members",
            self.org_url
        )
    }

    fn identities_url(&self) -> String {
        format!("{}/_apis/identities", self.org_url)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> RepoResult<Vec<T>> {
        let mut request = self
            .client
            .get(url)
            .query(&[("api-version", self.api_version.as_str())])
            .query(query);
        if let Some(pat) = &self.pat {
            request = request.basic_auth("", Some(pat));
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Directory(format!("request to {url} failed: {e}")))?;
        if !response.status().is_success() {
            return Err(DomainError::Directory(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        let list: ValueList<T> = response
            .json()
            .await
            .map_err(|e| DomainError::Directory(format!("invalid response from {url}: {e}")))?;
        Ok(list.value)
    }
}

#[async_trait]
impl TeamDirectory for RestTeamDirectory {
    #[instrument(skip(self))]
    async fn list_teams(&self, project_id: &str) -> RepoResult<Vec<Team>> {
        let teams: Vec<Team> = self.get_list(&self.teams_url(project_id), &[]).await?;
        debug!(count = teams.len(), "Fetched teams");
        Ok(teams)
    }

    #[instrument(skip(self))]
    async fn team_members(
        &self,
        project_id: &str,
        team_id: &str,
        top: usize,
        skip: usize,
    ) -> RepoResult<Vec<TeamMember>> {
        self.get_list(
            &self.members_url(project_id, team_id),
            &[("$top", top.to_string()), ("$skip", skip.to_string())],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn search_identities(&self, query: &str) -> RepoResult<Vec<PlatformIdentity>> {
        let records: Vec<IdentityRecord> = self
            .get_list(
                &self.identities_url(),
                &[
                    ("searchFilter", "General".to_string()),
                    ("filterValue", query.to_string()),
                    ("queryMembership", "None".to_string()),
                ],
            )
            .await?;
        Ok(records.into_iter().map(PlatformIdentity::from).collect())
    }
}
