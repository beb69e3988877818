//! Session state for the agent client.
//!
//! Tracks the single authenticated [`Agent`](khata_core::models::Agent),
//! persists it across restarts, and broadcasts login/logout to
//! subscribers. The durable backend and the credential check are both
//! trait seams, so embedders and tests can swap them out.

mod storage;
mod store;

pub use storage::{
    FileSessionStorage, MemorySessionStorage, SessionStorage, SessionStorageError,
    SessionStorageResult,
};
pub use store::{AuthSubscription, CredentialVerifier, SessionStore};
