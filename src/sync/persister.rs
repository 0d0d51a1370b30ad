//! Configuration Persister
//!
//! Background worker that writes staged configuration edits as new versions.
//! One worker runs per session and keeps at most one write in flight; edits
//! staged while a write is running coalesce into the next write. The worker
//! is aborted when its handle is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::client::ConfigSyncClient;
use crate::auth::UserId;
use crate::userconfig::PendingEdits;

/// Outcome of the most recent persistence attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PersistStatus {
    /// Nothing has been written yet
    Idle,
    /// A write for this generation is in flight
    Persisting { generation: u64 },
    /// This generation is stored
    Persisted { generation: u64, at: DateTime<Utc> },
    /// Writing this generation failed; the edit stays staged
    Failed { generation: u64, error: String },
}

impl PersistStatus {
    /// Whether the attempt for `generation` (or a newer one) has finished
    pub fn settles(&self, generation: u64) -> bool {
        match self {
            PersistStatus::Persisted { generation: g, .. }
            | PersistStatus::Failed { generation: g, .. } => *g >= generation,
            _ => false,
        }
    }
}

/// Handle to a running persistence worker
pub struct ConfigPersister {
    status: watch::Receiver<PersistStatus>,
    handle: JoinHandle<()>,
}

impl ConfigPersister {
    /// Spawn a worker persisting `edits` for `user_id`
    pub fn spawn(client: Arc<ConfigSyncClient>, user_id: UserId, edits: PendingEdits) -> Self {
        let (status_tx, status) = watch::channel(PersistStatus::Idle);
        let handle = tokio::spawn(run(client, user_id, edits, status_tx));

        Self { status, handle }
    }

    /// Current persistence status
    pub fn status(&self) -> PersistStatus {
        self.status.borrow().clone()
    }

    /// Wait until `generation` (or a newer one) has been written or has failed
    ///
    /// Returns false if the wait timed out or the worker stopped.
    pub async fn wait_for(&self, generation: u64, timeout: Duration) -> bool {
        let mut status = self.status.clone();
        let settled = tokio::time::timeout(timeout, status.wait_for(|s| s.settles(generation)));

        let settled = matches!(settled.await, Ok(Ok(_)));
        settled
    }
}

impl Drop for ConfigPersister {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(
    client: Arc<ConfigSyncClient>,
    user_id: UserId,
    mut edits: PendingEdits,
    status: watch::Sender<PersistStatus>,
) {
    while let Some(edit) = edits.next().await {
        let generation = edit.generation;
        status.send_replace(PersistStatus::Persisting { generation });

        match client.persist(user_id, &edit.config).await {
            Ok(()) => {
                let cleared = edits.complete(generation);
                tracing::debug!(user_id, generation, cleared, "Configuration edit persisted");
                status.send_replace(PersistStatus::Persisted {
                    generation,
                    at: Utc::now(),
                });
            }
            Err(e) => {
                tracing::warn!(user_id, generation, error = %e, "Failed to persist configuration edit");
                status.send_replace(PersistStatus::Failed {
                    generation,
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(user_id, "Configuration persister stopped");
}
