use std::sync::Arc;

use service::storage::DocumentStore;
use service::UserService;

/// Shared handler state. Cloned per request; the service inside is shared.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { users: Arc::new(UserService::new(store)) }
    }
}
