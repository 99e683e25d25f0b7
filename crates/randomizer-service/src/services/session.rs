//! Session handles - one logical thread of control per open view
//!
//! Actions on a session run one at a time. A second action arriving while
//! one is suspended is rejected instead of queued. Closing a session flips
//! its liveness flag so a suspended action discards its results.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};

/// Shared flag telling whether the owning view is still open
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn detach(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// `Detached` once the view is gone
    pub fn ensure_alive(&self) -> ServiceResult<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(ServiceError::Detached)
        }
    }
}

/// Busy flag held up for the lifetime of the guard, lowered on drop
///
/// An action dropped at an await point still clears the flag.
pub struct BusyGuard<'a>(&'a mut bool);

impl<'a> BusyGuard<'a> {
    pub fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Session state that carries its own liveness flag
pub trait Attached {
    fn liveness(&self) -> &Liveness;
}

/// Registry entry for one open session
pub struct SessionHandle<S> {
    id: Uuid,
    inner: Arc<Mutex<S>>,
    liveness: Liveness,
    opened_at: Instant,
    /// Milliseconds after `opened_at` of the last begin or read
    last_used_ms: Arc<AtomicU64>,
}

impl<S> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            liveness: self.liveness.clone(),
            opened_at: self.opened_at,
            last_used_ms: Arc::clone(&self.last_used_ms),
        }
    }
}

impl<S: Attached> SessionHandle<S> {
    pub fn new(session: S) -> Self {
        let liveness = session.liveness().clone();
        Self {
            id: Uuid::new_v4(),
            inner: Arc::new(Mutex::new(session)),
            liveness,
            opened_at: Instant::now(),
            last_used_ms: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<S> SessionHandle<S> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Time since the last action or read
    pub fn idle_for(&self) -> Duration {
        let last_used = Duration::from_millis(self.last_used_ms.load(Ordering::SeqCst));
        self.opened_at.elapsed().saturating_sub(last_used)
    }

    /// An action currently holds the session
    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    fn touch(&self) {
        let elapsed = u64::try_from(self.opened_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_used_ms.fetch_max(elapsed, Ordering::SeqCst);
    }

    /// Exclusive access for one action; `Busy` while another action runs
    pub fn begin(&self) -> ServiceResult<OwnedMutexGuard<S>> {
        self.liveness.ensure_alive()?;
        self.touch();
        Arc::clone(&self.inner)
            .try_lock_owned()
            .map_err(|_| ServiceError::Busy)
    }

    /// Wait for the in-flight action and read the state
    pub async fn read(&self) -> ServiceResult<MutexGuard<'_, S>> {
        self.liveness.ensure_alive()?;
        self.touch();
        Ok(self.inner.lock().await)
    }

    /// Tear the view down; suspended actions discard their updates
    pub fn close(&self) {
        self.liveness.detach();
    }
}
