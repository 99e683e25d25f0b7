//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the configuration and the registries of open panel and settings sessions.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use randomizer_common::AppConfig;
use randomizer_service::{
    PanelSession, ServiceContext, ServiceError, ServiceResult, SessionHandle, SettingsSession,
};
use tracing::info;
use uuid::Uuid;

/// Open sessions of one kind, keyed by handle id
pub struct SessionRegistry<S> {
    sessions: DashMap<Uuid, SessionHandle<S>>,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }
}

impl<S> SessionRegistry<S> {
    pub fn insert(&self, handle: SessionHandle<S>) -> Uuid {
        let id = handle.id();
        self.sessions.insert(id, handle);
        id
    }

    /// Handle of an open session
    pub fn get(&self, id: Uuid) -> ServiceResult<SessionHandle<S>> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::not_found("Session", id.to_string()))
    }

    /// Remove and detach a session; in-flight actions discard their results
    pub fn close(&self, id: Uuid) -> ServiceResult<()> {
        let (_, handle) = self
            .sessions
            .remove(&id)
            .ok_or_else(|| ServiceError::not_found("Session", id.to_string()))?;
        handle.close();
        Ok(())
    }

    /// Close sessions left idle longer than `max_idle`; busy sessions stay
    pub fn close_idle(&self, max_idle: Duration) -> usize {
        let expired: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|entry| !entry.is_busy() && entry.idle_for() > max_idle)
            .map(|entry| *entry.key())
            .collect();

        for id in &expired {
            if let Some((_, handle)) = self.sessions.remove(id) {
                handle.close();
            }
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Application configuration
    config: Arc<AppConfig>,
    panels: Arc<SessionRegistry<PanelSession>>,
    settings: Arc<SessionRegistry<SettingsSession>>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            panels: Arc::new(SessionRegistry::default()),
            settings: Arc::new(SessionRegistry::default()),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn panels(&self) -> &SessionRegistry<PanelSession> {
        &self.panels
    }

    pub fn settings(&self) -> &SessionRegistry<SettingsSession> {
        &self.settings
    }

    /// Close panels and editors nobody has touched within the idle timeout
    pub fn expire_idle_sessions(&self) -> usize {
        let max_idle = self.config.sessions.idle_timeout();
        let panels = self.panels.close_idle(max_idle);
        let editors = self.settings.close_idle(max_idle);
        if panels + editors > 0 {
            info!(panels, editors, "Idle sessions closed");
        }
        panels + editors
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("panels", &self.panels.len())
            .field("settings", &self.settings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use randomizer_service::services::{Attached, Liveness};

    struct StubSession(Liveness);

    impl Attached for StubSession {
        fn liveness(&self) -> &Liveness {
            &self.0
        }
    }

    #[test]
    fn test_registry_lifecycle() {
        let registry = SessionRegistry::default();
        assert!(registry.is_empty());

        let handle = SessionHandle::new(StubSession(Liveness::new()));
        let id = registry.insert(handle.clone());
        assert_eq!(registry.len(), 1);
        assert!(registry.get(id).is_ok());

        registry.close(id).unwrap();
        assert!(!handle.is_open());
        assert!(matches!(registry.get(id), Err(ServiceError::NotFound { .. })));
        assert!(registry.close(id).is_err());
    }

    #[tokio::test]
    async fn test_idle_sessions_are_closed() {
        let registry = SessionRegistry::default();
        let idle = SessionHandle::new(StubSession(Liveness::new()));
        let working = SessionHandle::new(StubSession(Liveness::new()));
        let idle_id = registry.insert(idle.clone());
        let working_id = registry.insert(working.clone());

        tokio::time::sleep(Duration::from_millis(20)).await;
        let guard = working.begin().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(registry.close_idle(Duration::from_secs(60)), 0);
        assert_eq!(registry.close_idle(Duration::from_millis(5)), 1);
        assert!(!idle.is_open());
        assert!(registry.get(idle_id).is_err());
        assert!(registry.get(working_id).is_ok());

        drop(guard);
        assert_eq!(registry.close_idle(Duration::from_millis(5)), 1);
        assert!(!working.is_open());
        assert!(registry.is_empty());
    }
}
