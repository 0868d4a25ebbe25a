//! Routes for querying account information.

use chrono::{DateTime, Utc};
use rocket::{get, serde::json::Json, State};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use app::account;

use crate::{
    access,
    error::{self, JsonError},
    state::RocketState,
};

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct UserModel {
    /// Unique account identifier.
    pub(super) id: Uuid,
    /// Registered username.
    pub(super) username: String,
    /// Registered email, normalized to lowercase.
    pub(super) email: String,
    /// Account creation time.
    pub(super) created_at: DateTime<Utc>,
}

impl UserModel {
    pub(super) fn from_entity(user: &account::User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.0.clone(),
            email: user.email.0.clone(),
            created_at: user.created,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct UserResponse {
    user: UserModel,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum UserError {
    /// Storage is temporarily unavailable, retry later.
    ServiceUnavailable,
}

/// Get the authenticated account's details.
#[openapi(tag = "User")]
#[get("/user")]
pub(super) async fn get(
    guard: access::AccountGuard,
    state: &State<RocketState>,
) -> Result<Option<Json<UserResponse>>, JsonError<UserError>> {
    let user = account::get(&state.db, guard.account_id())
        .await
        .map_err(|e| {
            log::error!("account lookup failed: {}", e);
            error::service_unavailable(UserError::ServiceUnavailable)
        })?;
    Ok(user.map(|user| {
        Json(UserResponse {
            user: UserModel::from_entity(&user),
        })
    }))
}
