use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ModelError;

/// Identifier of a user record. Serialized as a string key inside the
/// store document.
pub type UserId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub created_at: DateTime<Utc>,
    pub display_name: String,
    pub email: String,
}

/// Input for creating a user; `id` and `created_at` are assigned by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    pub display_name: String,
    pub email: String,
}

/// Partial update: only `Some` fields are applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UpdateUser {
    /// True when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.email.is_none()
    }
}

/// The whole persisted document: an id counter and the records keyed by id.
///
/// `increment` only ever grows; it holds the last id handed out, so every
/// key in `list` is at most `increment` and deleted ids are never reissued.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStore {
    #[serde(default)]
    pub increment: UserId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub list: BTreeMap<UserId, User>,
}

fn null_as_empty<'de, D>(de: D) -> Result<BTreeMap<UserId, User>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<UserId, User>>::deserialize(de)?.unwrap_or_default())
}

impl UserStore {
    /// Reject documents whose keys run ahead of the counter; allocating from
    /// such a store would hand out an id that is already taken.
    pub fn check_invariants(&self) -> Result<(), ModelError> {
        match self.list.keys().next_back() {
            Some(&id) if id > self.increment => {
                Err(ModelError::IdAboveCounter { id, increment: self.increment })
            }
            _ => Ok(()),
        }
    }

    /// Bump the counter and return the fresh id.
    pub fn allocate_id(&mut self) -> Result<UserId, ModelError> {
        let next = self
            .increment
            .checked_add(1)
            .ok_or(ModelError::IdSpaceExhausted(self.increment))?;
        self.increment = next;
        Ok(next)
    }

    /// Allocate an id and insert a new record stamped with `created_at`.
    pub fn create(&mut self, input: CreateUser, created_at: DateTime<Utc>) -> Result<(UserId, User), ModelError> {
        let id = self.allocate_id()?;
        let user = User { created_at, display_name: input.display_name, email: input.email };
        self.list.insert(id, user.clone());
        Ok((id, user))
    }

    pub fn get(&self, id: UserId) -> Option<&User> {
        self.list.get(&id)
    }

    /// Apply the supplied fields to an existing record; `None` if absent.
    pub fn update(&mut self, id: UserId, patch: UpdateUser) -> Option<&User> {
        let user = self.list.get_mut(&id)?;
        if let Some(name) = patch.display_name {
            user.display_name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        Some(user)
    }

    /// Remove a record. The counter is left alone.
    pub fn remove(&mut self, id: UserId) -> Option<User> {
        self.list.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
