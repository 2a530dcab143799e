use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use models::{CreateUser, UpdateUser, User, UserId};
use serde::{Deserialize, Serialize};

use crate::errors::JsonApiError;
use crate::state::AppState;

/// A user as returned over HTTP: the stored record plus its id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserResponse {
    pub id: UserId,
    #[serde(flatten)]
    pub user: User,
}

impl UserResponse {
    fn new(id: UserId, user: User) -> Self { Self { id, user } }
}

/// Ids in paths are plain unsigned decimals covering the whole id space.
/// Signs, whitespace and the empty string are rejected.
pub fn parse_user_id(raw: &str) -> Result<UserId, JsonApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(JsonApiError::bad_request(format!("invalid user id {raw:?}: expected decimal digits")));
    }
    raw.parse::<UserId>()
        .map_err(|e| JsonApiError::bad_request(format!("invalid user id {raw:?}: {e}")))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, JsonApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(|(id, u)| UserResponse::new(id, u)).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), JsonApiError> {
    let Json(input) = payload?;
    let (id, user) = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::new(id, user))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserResponse>, JsonApiError> {
    let id = parse_user_id(&raw_id)?;
    let user = state.users.get(id).await?;
    Ok(Json(UserResponse::new(id, user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> Result<StatusCode, JsonApiError> {
    let id = parse_user_id(&raw_id)?;
    let Json(patch) = payload?;
    state.users.update(id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    let id = parse_user_id(&raw_id)?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
