//! Service context - dependency container for services
//!
//! Holds the persistence gateway, the platform directory, the content source
//! and the tunables shared by every session.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use randomizer_core::{ContentSource, RandomSource, TeamDirectory, ThreadRandom};
use randomizer_store::PersistenceGateway;

use super::error::ServiceError;

/// Default membership page size
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default minimum interval between settings saves
pub const DEFAULT_SAVE_MIN_INTERVAL: Duration = Duration::from_millis(600);

/// Produces the random source handed to each new panel session
pub type RandomFactory = Arc<dyn Fn() -> Box<dyn RandomSource> + Send + Sync>;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    gateway: PersistenceGateway,
    directory: Arc<dyn TeamDirectory>,
    content: Arc<dyn ContentSource>,
    random_factory: RandomFactory,
    page_size: usize,
    save_min_interval: Duration,
    fixed_date: Option<NaiveDate>,
}

impl ServiceContext {
    // === Ports ===

    /// Get the persistence gateway
    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// Get the team directory
    pub fn directory(&self) -> &dyn TeamDirectory {
        self.directory.as_ref()
    }

    /// Get the daily content source
    pub fn content(&self) -> &dyn ContentSource {
        self.content.as_ref()
    }

    // === Tunables ===

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn save_min_interval(&self) -> Duration {
        self.save_min_interval
    }

    /// Fresh random source for a new session
    pub fn random_source(&self) -> Box<dyn RandomSource> {
        (self.random_factory)()
    }

    /// Local calendar date used for the day keys
    pub fn today(&self) -> NaiveDate {
        self.fixed_date.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("gateway", &self.gateway)
            .field("page_size", &self.page_size)
            .field("save_min_interval", &self.save_min_interval)
            .field("fixed_date", &self.fixed_date)
            .finish()
    }
}

/// Builder for ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    gateway: Option<PersistenceGateway>,
    directory: Option<Arc<dyn TeamDirectory>>,
    content: Option<Arc<dyn ContentSource>>,
    random_factory: Option<RandomFactory>,
    page_size: Option<usize>,
    save_min_interval: Option<Duration>,
    fixed_date: Option<NaiveDate>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gateway(mut self, gateway: PersistenceGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn TeamDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn content(mut self, content: Arc<dyn ContentSource>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn random_factory(mut self, factory: RandomFactory) -> Self {
        self.random_factory = Some(factory);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn save_min_interval(mut self, interval: Duration) -> Self {
        self.save_min_interval = Some(interval);
        self
    }

    /// Pin the calendar date instead of reading the local clock
    pub fn fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    pub fn build(self) -> Result<ServiceContext, ServiceError> {
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ServiceError::validation("page_size must be positive"));
        }

        Ok(ServiceContext {
            gateway: self
                .gateway
                .ok_or_else(|| ServiceError::validation("gateway is required"))?,
            directory: self
                .directory
                .ok_or_else(|| ServiceError::validation("directory is required"))?,
            content: self
                .content
                .ok_or_else(|| ServiceError::validation("content is required"))?,
            random_factory: self
                .random_factory
                .unwrap_or_else(|| Arc::new(|| Box::new(ThreadRandom) as Box<dyn RandomSource>)),
            page_size,
            save_min_interval: self.save_min_interval.unwrap_or(DEFAULT_SAVE_MIN_INTERVAL),
            fixed_date: self.fixed_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{ScriptedContent, ScriptedDirectory};
    use randomizer_store::MemoryKeyValueStore;

    #[test]
    fn test_builder_requires_ports() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("gateway is required"));
    }

    #[test]
    fn test_builder_defaults() {
        let ctx = ServiceContextBuilder::new()
            .gateway(PersistenceGateway::new(Arc::new(MemoryKeyValueStore::new())))
            .directory(Arc::new(ScriptedDirectory::new()))
            .content(Arc::new(ScriptedContent::default()))
            .fixed_date(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
            .build()
            .unwrap();

        assert_eq!(ctx.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(ctx.save_min_interval(), DEFAULT_SAVE_MIN_INTERVAL);
        assert_eq!(ctx.today(), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = ServiceContextBuilder::new()
            .gateway(PersistenceGateway::new(Arc::new(MemoryKeyValueStore::new())))
            .directory(Arc::new(ScriptedDirectory::new()))
            .content(Arc::new(ScriptedContent::default()))
            .page_size(0)
            .build();
        assert!(result.is_err());
    }
}
