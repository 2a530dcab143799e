use std::sync::Arc;

use chrono::Utc;
use models::{CreateUser, UpdateUser, User, UserId};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::metrics::observe;
use crate::storage::DocumentStore;

/// CRUD over user records, each call one load/mutate/save cycle against
/// the injected [`DocumentStore`].
///
/// All cycles run under a single async mutex, so two concurrent creates
/// can never both start from the same counter and drop each other's record.
/// This only covers callers sharing one `UserService`; separate processes
/// writing the same file are not coordinated.
pub struct UserService {
    store: Arc<dyn DocumentStore>,
    lock: Mutex<()>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, lock: Mutex::new(()) }
    }

    /// All users with their ids, ordered by id.
    pub async fn list(&self) -> Result<Vec<(UserId, User)>, ServiceError> {
        let res: Result<Vec<(UserId, User)>, ServiceError> = async {
            let _guard = self.lock.lock().await;
            let doc = self.store.load().await?;
            Ok(doc.list.into_iter().collect())
        }
        .await;
        observe("list", &res);
        res
    }

    /// Get a user by id.
    pub async fn get(&self, id: UserId) -> Result<User, ServiceError> {
        let res: Result<User, ServiceError> = async {
            let _guard = self.lock.lock().await;
            let mut doc = self.store.load().await?;
            doc.list.remove(&id).ok_or_else(|| ServiceError::user_not_found(id))
        }
        .await;
        observe("get", &res);
        res
    }

    /// Create a user; returns the freshly allocated id and the stored record.
    pub async fn create(&self, input: CreateUser) -> Result<(UserId, User), ServiceError> {
        let res: Result<(UserId, User), ServiceError> = async {
            let _guard = self.lock.lock().await;
            let mut doc = self.store.load().await?;
            let (id, user) = doc.create(input, Utc::now())?;
            self.store.save(&doc).await?;
            info!(user_id = id, "user created");
            Ok((id, user))
        }
        .await;
        observe("create", &res);
        res
    }

    /// Apply a partial update; fields left `None` keep their value. A patch
    /// with no fields still checks the id but leaves the medium untouched.
    pub async fn update(&self, id: UserId, patch: UpdateUser) -> Result<User, ServiceError> {
        let res: Result<User, ServiceError> = async {
            let _guard = self.lock.lock().await;
            let mut doc = self.store.load().await?;
            let unchanged = patch.is_empty();
            let updated = doc
                .update(id, patch)
                .cloned()
                .ok_or_else(|| ServiceError::user_not_found(id))?;
            if unchanged {
                debug!(user_id = id, "empty patch; nothing to save");
                return Ok(updated);
            }
            self.store.save(&doc).await?;
            info!(user_id = id, "user updated");
            Ok(updated)
        }
        .await;
        observe("update", &res);
        res
    }

    /// Delete a user. The id is retired, never handed out again.
    pub async fn delete(&self, id: UserId) -> Result<(), ServiceError> {
        let res: Result<(), ServiceError> = async {
            let _guard = self.lock.lock().await;
            let mut doc = self.store.load().await?;
            doc.remove(id).ok_or_else(|| ServiceError::user_not_found(id))?;
            self.store.save(&doc).await?;
            debug!(user_id = id, increment = doc.increment, "user deleted");
            Ok(())
        }
        .await;
        observe("delete", &res);
        res
    }
}
