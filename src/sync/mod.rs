//! Configuration Sync
//!
//! Keeps a session's configuration in step with the versioned backend table.
//!
//! ## Data Flow
//!
//! 1. `ConfigSyncClient::fetch_latest` loads the newest version on session open
//! 2. Edits are staged in the session's `UserConfigStore`
//! 3. `ConfigPersister` writes each staged generation as a new version
//! 4. A successful write clears the staged edit if nothing newer arrived

mod client;
mod persister;

pub use client::{decode_stored_config, insert_config_mutation, latest_config_query, ConfigSyncClient};
pub use persister::{ConfigPersister, PersistStatus};
