//! Server setup and initialization
//!
//! Wires the store, platform adapters and service context into the router.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use randomizer_common::{AppConfig, AppError, AppResult, StoreBackend};
use randomizer_core::KeyValueStore;
use randomizer_service::{HttpContentSource, RestTeamDirectory, ServiceContextBuilder};
use randomizer_store::{MemoryKeyValueStore, PersistenceGateway, RedisKeyValueStore, RedisPool};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Router with middleware, bound to the state
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let router = apply_middleware(create_router(), &config.cors, config.app.env.is_production());
    router.with_state(state)
}

/// Settings blob store for the configured backend
pub async fn create_store(config: &AppConfig) -> AppResult<Arc<dyn KeyValueStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory settings store; data is lost on restart");
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
        StoreBackend::Redis => {
            let redis = config
                .redis
                .as_ref()
                .ok_or_else(|| AppError::wiring("REDIS_URL is required for the redis store"))?;
            let pool = RedisPool::from_config(redis).map_err(|e| AppError::store(e.to_string()))?;
            pool.ping().await.map_err(|e| AppError::store(e.to_string()))?;
            info!("Redis settings store reachable");
            Ok(Arc::new(RedisKeyValueStore::new(pool)))
        }
    }
}

/// Build the store, the platform adapters and the shared state
pub async fn create_app_state(config: AppConfig) -> AppResult<AppState> {
    let store = create_store(&config).await?;
    let directory = RestTeamDirectory::new(&config.devops)?;
    let content = HttpContentSource::new(&config.content)?;

    let service_context = ServiceContextBuilder::new()
        .gateway(PersistenceGateway::with_key(store, config.store.key.clone()))
        .directory(Arc::new(directory))
        .content(Arc::new(content))
        .page_size(config.devops.page_size)
        .save_min_interval(config.settings.save_min_interval())
        .build()?;

    Ok(AppState::new(service_context, config))
}

/// Close idle sessions on the configured sweep interval
pub fn spawn_session_sweeper(state: AppState) -> tokio::task::JoinHandle<()> {
    let period = state.config().sessions.sweep_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            state.expire_idle_sessions();
        }
    })
}

/// Serve until the listener fails
pub async fn run_server(app: Router, addr: SocketAddr) -> AppResult<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Randomizer API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build everything from configuration and serve
pub async fn run(config: AppConfig) -> AppResult<()> {
    let address = config.api.address();
    let addr: SocketAddr = address
        .parse()
        .map_err(|_| AppError::wiring(format!("Invalid bind address {address}")))?;

    let state = create_app_state(config).await?;
    let sweeper = spawn_session_sweeper(state.clone());
    let served = run_server(create_app(state), addr).await;
    sweeper.abort();
    served
}
