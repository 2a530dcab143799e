use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use models::UserStore;
use tokio::sync::RwLock;

use super::{decode, encode, DocumentStore};
use crate::errors::ServiceError;

/// In-process store keeping the encoded document bytes.
///
/// Goes through the same codec as [`super::JsonFileStore`], so seeding it
/// with malformed bytes yields `CorruptFormat` exactly like a bad file.
/// Writes can be made to fail for exercising error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: RwLock<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// An empty medium; the first load yields an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A medium pre-filled with raw bytes.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: RwLock::new(Some(bytes.into())), fail_writes: AtomicBool::new(false) }
    }

    /// Current raw contents, `None` until something was saved or seeded.
    pub async fn bytes(&self) -> Option<Vec<u8>> {
        self.bytes.read().await.clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> Result<UserStore, ServiceError> {
        match self.bytes.read().await.as_deref() {
            Some(bytes) => decode(bytes),
            None => Ok(UserStore::default()),
        }
    }

    async fn save(&self, store: &UserStore) -> Result<(), ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::io(
                Path::new("<memory>"),
                io::Error::new(io::ErrorKind::Other, "writes disabled"),
            ));
        }
        let data = encode(store)?;
        *self.bytes.write().await = Some(data);
        Ok(())
    }
}
