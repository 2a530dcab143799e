use thiserror::Error;

use crate::user::UserId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("user id space exhausted at {0}")]
    IdSpaceExhausted(UserId),
    #[error("user id {id} exceeds the id counter {increment}")]
    IdAboveCounter { id: UserId, increment: UserId },
}
