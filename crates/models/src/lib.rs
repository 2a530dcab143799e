//! Domain types for the user registry: the persisted [`user::UserStore`]
//! document and the [`user::User`] records it holds.

pub mod errors;
pub mod user;

pub use user::{CreateUser, UpdateUser, User, UserId, UserStore};
