//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::shell::{ShellServices, ShellSession};

/// A session shared between requests; the mutex serialises its handlers
pub type SharedSession = Arc<Mutex<ShellSession>>;

struct SessionEntry {
    session: SharedSession,
    /// Milliseconds since the registry epoch
    last_access: AtomicU64,
}

/// Open shell sessions by id
///
/// Sessions leave the registry when closed or after `idle_ttl` without a
/// request.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    max_sessions: usize,
    idle_ttl: Duration,
    epoch: Instant,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            idle_ttl,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Whether another session may be opened
    pub async fn has_capacity(&self) -> bool {
        self.sessions.read().await.len() < self.max_sessions
    }

    /// Register a session under a fresh id
    pub async fn insert(&self, session: ShellSession) -> ApiResult<(Uuid, SharedSession)> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            return Err(session_limit(self.max_sessions));
        }

        let id = Uuid::new_v4();
        let shared = Arc::new(Mutex::new(session));
        sessions.insert(
            id,
            SessionEntry {
                session: Arc::clone(&shared),
                last_access: AtomicU64::new(self.now_ms()),
            },
        );
        Ok((id, shared))
    }

    /// Look up a session and mark it as used
    pub async fn get(&self, id: Uuid) -> ApiResult<SharedSession> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(&id)
            .ok_or_else(|| ApiError::NotFound(format!("session {}", id)))?;

        entry.last_access.store(self.now_ms(), Ordering::Relaxed);
        Ok(Arc::clone(&entry.session))
    }

    pub async fn remove(&self, id: Uuid) -> ApiResult<SharedSession> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|entry| entry.session)
            .ok_or_else(|| ApiError::NotFound(format!("session {}", id)))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Unregister sessions idle for at least `idle_ttl`
    async fn take_idle(&self) -> Vec<(Uuid, SharedSession)> {
        let now = self.now_ms();
        let ttl = self.idle_ttl.as_millis() as u64;

        let mut sessions = self.sessions.write().await;
        let idle: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, entry)| {
                now.saturating_sub(entry.last_access.load(Ordering::Relaxed)) >= ttl
            })
            .map(|(id, _)| *id)
            .collect();

        idle.into_iter()
            .filter_map(|id| sessions.remove(&id).map(|entry| (id, entry.session)))
            .collect()
    }

    /// Flush and drop idle sessions, returning how many were closed
    pub async fn sweep_idle(&self, flush_timeout: Duration) -> usize {
        if self.is_empty().await {
            return 0;
        }

        let expired = self.take_idle().await;
        for (id, shared) in &expired {
            let session = shared.lock().await;
            let flushed = session.flush(flush_timeout).await;
            if flushed {
                tracing::info!(session_id = %id, "Idle session closed");
            } else {
                tracing::warn!(
                    session_id = %id,
                    status = ?session.persist_status(),
                    "Idle session closed with unsaved edits"
                );
            }
        }
        expired.len()
    }

    /// Start the background task that sweeps idle sessions
    pub fn start_sweeper(
        self: Arc<Self>,
        every: Duration,
        flush_timeout: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);

            loop {
                interval.tick().await;

                let closed = self.sweep_idle(flush_timeout).await;
                if closed > 0 {
                    let open = self.len().await;
                    tracing::debug!(closed, open, "Swept idle sessions");
                }
            }
        })
    }
}

pub(crate) fn session_limit(max: usize) -> ApiError {
    ApiError::ServiceUnavailable(format!("session limit of {} reached", max))
}

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Backend clients handed to every new session
    pub services: ShellServices,
    /// Open sessions
    pub sessions: Arc<SessionRegistry>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(services: ShellServices, config: ApiConfig) -> Self {
        Self {
            services,
            sessions: Arc::new(SessionRegistry::new(
                config.max_sessions,
                config.session_idle_ttl(),
            )),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionClaims;
    use crate::graphql::{GraphqlTransport, MemoryBackend};
    use crate::shell::ShellOptions;
    use crate::sync::ConfigSyncClient;

    const WAIT: Duration = Duration::from_secs(5);

    fn services(backend: &Arc<MemoryBackend>) -> ShellServices {
        ShellServices::new(
            Arc::clone(backend) as Arc<dyn GraphqlTransport>,
            ShellOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_recent_sessions_survive_sweep() {
        let backend = Arc::new(MemoryBackend::new());
        let registry = SessionRegistry::new(4, Duration::from_secs(3600));

        let session = ShellSession::open(services(&backend), SessionClaims::default()).await;
        let (id, _) = registry.insert(session).await.unwrap();

        assert_eq!(registry.sweep_idle(WAIT).await, 0);
        assert!(registry.get(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_flushes_and_frees_capacity() {
        let backend = Arc::new(MemoryBackend::new());
        let registry = SessionRegistry::new(1, Duration::ZERO);

        let session = ShellSession::open(services(&backend), SessionClaims::default()).await;
        let (id, shared) = registry.insert(session).await.unwrap();
        shared.lock().await.add_dashboard("Sales").unwrap();
        drop(shared);
        assert!(!registry.has_capacity().await);

        assert_eq!(registry.sweep_idle(WAIT).await, 1);
        assert!(registry.is_empty().await);
        assert!(registry.has_capacity().await);
        assert!(registry.get(id).await.is_err());

        let stored = ConfigSyncClient::new(Arc::clone(&backend) as Arc<dyn GraphqlTransport>)
            .fetch_latest(1)
            .await
            .unwrap();
        assert_eq!(stored.dashboard_names(), vec!["Sales"]);
    }
}
