//! Test helpers for integration tests
//!
//! Provides a test server over scripted platform fakes and an in-memory
//! settings store, plus request and assertion helpers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use randomizer_api::{create_app, AppState};
use randomizer_common::AppConfig;
use randomizer_core::{RandomSource, SequenceRandom};
use randomizer_service::ServiceContextBuilder;
use randomizer_store::{MemoryKeyValueStore, PersistenceGateway, SETTINGS_KEY};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{scenario_date, FakeContent, FakeDirectory};

/// Knobs for one test server
pub struct TestSetup {
    pub directory: FakeDirectory,
    pub content: FakeContent,
    /// Cycled by every panel's random source
    pub randoms: Vec<f64>,
    pub save_min_interval: Duration,
    pub seed: Option<Value>,
}

impl Default for TestSetup {
    fn default() -> Self {
        Self {
            directory: FakeDirectory::standard(),
            content: FakeContent::standard(),
            randoms: vec![0.0],
            save_min_interval: Duration::ZERO,
            seed: None,
        }
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryKeyValueStore>,
    pub directory: Arc<FakeDirectory>,
    pub content: Arc<FakeContent>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with the standard fixtures
    pub async fn start() -> Result<Self> {
        Self::start_with(TestSetup::default()).await
    }

    pub async fn start_with(setup: TestSetup) -> Result<Self> {
        let store = Arc::new(MemoryKeyValueStore::new());
        if let Some(seed) = setup.seed {
            store.put(SETTINGS_KEY, seed);
        }
        let directory = Arc::new(setup.directory);
        let content = Arc::new(setup.content);
        let randoms = setup.randoms;

        let context = ServiceContextBuilder::new()
            .gateway(PersistenceGateway::new(store.clone()))
            .directory(directory.clone())
            .content(content.clone())
            .random_factory(Arc::new(move || {
                Box::new(SequenceRandom::new(randoms.clone())) as Box<dyn RandomSource>
            }))
            .save_min_interval(setup.save_min_interval)
            .fixed_date(scenario_date())
            .build()?;
        let app = create_app(AppState::new(context, test_config()?));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            store,
            directory,
            content,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    /// Make a POST request without a body
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        Ok(self.client.post(self.url(path)).send().await?)
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.put(self.url(path)).json(body).send().await?)
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).send().await?)
    }

    /// Current settings blob
    pub fn stored_settings(&self) -> Value {
        self.store.snapshot(SETTINGS_KEY).unwrap_or(Value::Null)
    }
}

/// Configuration with only the required values set
pub fn test_config() -> Result<AppConfig> {
    AppConfig::from_lookup(|name| match name {
        "API_PORT" => Some("0".to_string()),
        "DEVOPS_ORG_URL" => Some("http://devops.invalid/org".to_string()),
        _ => None,
    })
    .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}

/// Error code of an error response
pub async fn error_code(response: Response) -> Result<String> {
    let body: Value = response.json().await?;
    Ok(body["error"]["code"].as_str().unwrap_or_default().to_string())
}
