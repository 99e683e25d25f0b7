//! Daily content documents fetched over HTTP

use async_trait::async_trait;
use chrono::Utc;
use randomizer_common::ContentConfig;
use randomizer_core::{ContentSource, DomainError, RepoResult};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde_json::Value;
use tracing::{debug, instrument};

use super::REQUEST_TIMEOUT;

/// Fetches the question and holiday JSON documents, bypassing caches
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: reqwest::Client,
    questions_url: String,
    holidays_url: String,
}

impl HttpContentSource {
    pub fn new(config: &ContentConfig) -> RepoResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Content(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            client,
            questions_url: config.questions_url.clone(),
            holidays_url: config.holidays_url.clone(),
        })
    }

    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> RepoResult<Value> {
        let response = self
            .client
            .get(url)
            .query(&[("_", Utc::now().timestamp_millis())])
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DomainError::Content(format!("request to {url} failed: {e}")))?;

        let document: Value = response
            .json()
            .await
            .map_err(|e| DomainError::Content(format!("invalid JSON from {url}: {e}")))?;
        debug!("Fetched content document");
        Ok(document)
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_questions(&self) -> RepoResult<Value> {
        self.fetch(&self.questions_url).await
    }

    async fn fetch_holidays(&self) -> RepoResult<Value> {
        self.fetch(&self.holidays_url).await
    }
}
