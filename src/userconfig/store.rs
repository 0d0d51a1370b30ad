//! In-memory user configuration store
//!
//! Holds the authoritative configuration for one session and the staged edit
//! awaiting persistence. The staged edit lives in a single-slot mailbox
//! (`tokio::sync::watch`): staging overwrites the slot, and the persistence
//! worker clears it once the generation it wrote is still the one staged.
//!
//! ```text
//! edit() ──► current config ──► slot: Some(PendingEdit { generation, config })
//!                                        │
//!                          PendingEdits::next() ──► persist ──► complete(generation)
//! ```

use std::sync::Arc;
use tokio::sync::watch;

use super::error::{ConfigEditError, StoreError};
use super::types::{Dashboard, UserConfiguration};

/// A configuration snapshot staged for persistence
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    /// Monotonically increasing write token, starting at 1
    pub generation: u64,
    pub config: UserConfiguration,
}

type Slot = Arc<watch::Sender<Option<PendingEdit>>>;

/// Holds the current configuration and the staged edit slot
pub struct UserConfigStore {
    current: Option<UserConfiguration>,
    generation: u64,
    slot: Slot,
}

impl Default for UserConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserConfigStore {
    /// Create an empty store with nothing loaded
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            current: None,
            generation: 0,
            slot: Arc::new(tx),
        }
    }

    /// Replace the current configuration without staging it
    ///
    /// Used when a fetched version arrives from the backend.
    pub fn load(&mut self, config: UserConfiguration) {
        self.current = Some(config);
    }

    /// Whether a configuration has been loaded
    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// The current configuration, if loaded
    pub fn config(&self) -> Option<&UserConfiguration> {
        self.current.as_ref()
    }

    /// Dashboard names for the sidebar; empty until loaded
    pub fn dashboard_names(&self) -> Vec<String> {
        self.current
            .as_ref()
            .map(UserConfiguration::dashboard_names)
            .unwrap_or_default()
    }

    /// Look up a dashboard by name
    pub fn dashboard(&self, name: &str) -> Option<&Dashboard> {
        self.current.as_ref().and_then(|c| c.dashboard(name))
    }

    /// Apply an edit and stage the result for persistence
    ///
    /// The edit runs against a copy; if it fails the store is left unchanged
    /// and nothing is staged.
    pub fn edit<T, F>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut UserConfiguration) -> Result<T, ConfigEditError>,
    {
        let current = self.current.as_ref().ok_or(StoreError::NotLoaded)?;
        let mut draft = current.clone();
        let result = f(&mut draft)?;

        self.current = Some(draft);
        self.stage();
        Ok(result)
    }

    /// Stage the current configuration, returning its generation
    ///
    /// Returns `None` when nothing is loaded.
    pub fn stage(&mut self) -> Option<u64> {
        let config = self.current.clone()?;
        self.generation += 1;
        let generation = self.generation;

        self.slot.send_replace(Some(PendingEdit { generation, config }));
        tracing::debug!(generation, "Staged configuration edit");
        Some(generation)
    }

    /// The staged edit, if any
    pub fn pending(&self) -> Option<PendingEdit> {
        self.slot.borrow().clone()
    }

    /// Whether an edit is waiting to be persisted
    pub fn has_pending(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Generation of the most recently staged edit (0 if none yet)
    pub fn last_generation(&self) -> u64 {
        self.generation
    }

    /// Handle for the persistence worker
    pub fn pending_edits(&self) -> PendingEdits {
        PendingEdits {
            rx: self.slot.subscribe(),
            slot: Arc::clone(&self.slot),
            last_taken: 0,
        }
    }
}

/// Consumer side of the staged-edit slot
pub struct PendingEdits {
    rx: watch::Receiver<Option<PendingEdit>>,
    slot: Slot,
    last_taken: u64,
}

impl PendingEdits {
    /// Wait for a staged edit newer than the last one taken
    ///
    /// Edits staged while the caller is busy coalesce: only the newest is
    /// returned. Returns `None` if the slot is closed.
    pub async fn next(&mut self) -> Option<PendingEdit> {
        loop {
            let staged = self.rx.borrow_and_update().clone();
            if let Some(edit) = staged {
                if edit.generation > self.last_taken {
                    self.last_taken = edit.generation;
                    return Some(edit);
                }
            }

            if self.rx.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Clear the slot if it still holds `generation`
    ///
    /// Returns false when a newer edit was staged in the meantime; that edit
    /// stays pending.
    pub fn complete(&self, generation: u64) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.as_ref().map(|p| p.generation) == Some(generation) {
                *slot = None;
                true
            } else {
                false
            }
        })
    }
}
