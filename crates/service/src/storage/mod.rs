//! Storage abstractions for the service layer
//!
//! A [`DocumentStore`] persists the whole [`UserStore`] document at once:
//! `load` materializes it in memory, `save` replaces it wholesale. Both
//! backends share the JSON codec below so format errors look the same
//! regardless of where the bytes live.

pub mod json_file_store;
pub mod memory_store;

use async_trait::async_trait;
use models::UserStore;

use crate::errors::ServiceError;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Whole-document load/save over some backing medium.
/// Implementations can be file-backed, in-memory, or remote.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self) -> Result<UserStore, ServiceError>;
    async fn save(&self, store: &UserStore) -> Result<(), ServiceError>;
}

/// Decode a persisted document and check its id invariants.
pub fn decode(bytes: &[u8]) -> Result<UserStore, ServiceError> {
    let store: UserStore =
        serde_json::from_slice(bytes).map_err(|e| ServiceError::CorruptFormat(e.to_string()))?;
    store.check_invariants()?;
    Ok(store)
}

/// Serialize a document for writing. A failure here is a save-side error,
/// kept apart from [`ServiceError::CorruptFormat`] which only describes bad
/// bytes read back from the medium.
pub fn encode(store: &UserStore) -> Result<Vec<u8>, ServiceError> {
    serde_json::to_vec(store).map_err(|e| ServiceError::Encode(e.to_string()))
}
