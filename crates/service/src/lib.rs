//! Service layer for the user registry.
//! - `storage` loads and saves the whole [`models::UserStore`] document.
//! - `user_service` runs each CRUD operation as one load/mutate/save cycle.
//! - Errors are surfaced unmodified to callers as [`errors::ServiceError`].

pub mod errors;
pub mod metrics;
pub mod runtime;
pub mod storage;
pub mod user_service;

pub use user_service::UserService;
