//! GraphQL Transport
//!
//! Everything the shell sends to the backend goes through one transport:
//! a GraphQL document POSTed as `{"query": ...}`.
//!
//! ## Architecture
//!
//! - **GraphqlTransport**: async trait returning the response `data`
//! - **HasuraClient**: HTTP implementation with the admin-secret header
//! - **MemoryBackend**: in-process implementation over versioned rows
//! - **literal**: GraphQL string-literal escaping for embedded documents

mod client;
mod error;
pub mod literal;
mod memory;

pub use client::{
    decode, GraphqlErrorMessage, GraphqlResponse, GraphqlTransport, HasuraClient, HasuraConfig,
    ADMIN_SECRET_HEADER,
};
pub use error::{SyncError, SyncResult};
pub use memory::{MemoryBackend, StoredConfig};
