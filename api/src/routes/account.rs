//! Registration and login.

use rocket::{post, serde::json::Json, State};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use app::account;

use super::user::UserModel;
use crate::{
    access,
    error::{self, JsonResult},
    state::RocketState,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct RegisterRequest {
    /// Desired username, 3-20 letters, numbers and underscores.
    username: String,
    /// Email address; stored lowercased.
    email: String,
    /// At least 8 characters with an uppercase letter, a lowercase
    /// letter and a number.
    password: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct RegisterResponse {
    message: String,
    /// Identifier of the newly created account.
    user_id: Uuid,
    username: String,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum RegisterError {
    /// The username does not match the allowed grammar.
    InvalidUsername,
    /// The email address is not syntactically valid.
    InvalidEmail,
    /// The password does not meet the strength rules.
    InvalidPassword,
    /// The username is already taken.
    UsernameTaken,
    /// The email is already registered.
    EmailTaken,
    /// Unexpected error, please contact support.
    Unknown,
    /// Storage is temporarily unavailable, retry later.
    ServiceUnavailable,
}

/// Register a new account. A wallet with a zero balance is created along
/// with it.
#[openapi(tag = "Account")]
#[post("/register", data = "<req>")]
pub(super) async fn register(
    state: &State<RocketState>,
    _throttle: access::ClientThrottle,
    req: Json<RegisterRequest>,
) -> JsonResult<RegisterResponse, RegisterError> {
    account::create(&state.db, &req.username, &req.email, &req.password)
        .await
        .map(|user_id| {
            Json(RegisterResponse {
                message: "User registered successfully".to_owned(),
                user_id: user_id.0,
                username: req.username.trim().to_owned(),
            })
        })
        .map_err(|e| match e {
            account::Error::Validation(rule) => {
                error::bad_request(validation_status(rule), rule.to_string())
            }
            account::Error::DuplicateUsername => error::conflict(
                RegisterError::UsernameTaken,
                "username already exists".to_owned(),
            ),
            account::Error::DuplicateEmail => error::conflict(
                RegisterError::EmailTaken,
                "email already exists".to_owned(),
            ),
            account::Error::Credential(e) => {
                log::error!("credential hashing failed: {}", e);
                error::internal_server_error(
                    RegisterError::Unknown,
                    "registration failed, please try again later".to_owned(),
                )
            }
            account::Error::Storage(e) => {
                log::error!("registration failed: {}", e);
                error::service_unavailable(RegisterError::ServiceUnavailable)
            }
        })
}

fn validation_status(rule: account::ValidationError) -> RegisterError {
    match rule {
        account::ValidationError::InvalidUsername => RegisterError::InvalidUsername,
        account::ValidationError::InvalidEmail => RegisterError::InvalidEmail,
        account::ValidationError::PasswordTooShort
        | account::ValidationError::PasswordNeedsUppercase
        | account::ValidationError::PasswordNeedsLowercase
        | account::ValidationError::PasswordNeedsDigit => RegisterError::InvalidPassword,
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct LoginResponse {
    message: String,
    /// Session token; send it back as "Authorization: Bearer <token>".
    token: String,
    user: UserModel,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum LoginError {
    /// Unknown username or wrong password; deliberately not saying which.
    InvalidCredentials,
    /// Unexpected error, please contact support.
    Unknown,
    /// Storage is temporarily unavailable, retry later.
    ServiceUnavailable,
}

/// Log in with a username and password, receiving a session token.
#[openapi(tag = "Account")]
#[post("/login", data = "<req>")]
pub(super) async fn login(
    state: &State<RocketState>,
    _throttle: access::ClientThrottle,
    req: Json<LoginRequest>,
) -> JsonResult<LoginResponse, LoginError> {
    let user = account::authenticate(&state.db, &req.username, &req.password)
        .await
        .map_err(|e| match e {
            account::AuthError::InvalidCredentials => {
                log::warn!("failed login attempt: {}", req.username.trim());
                error::unauthorized(
                    LoginError::InvalidCredentials,
                    "invalid credentials".to_owned(),
                )
            }
            account::AuthError::Storage(e) => {
                log::error!("login failed: {}", e);
                error::service_unavailable(LoginError::ServiceUnavailable)
            }
        })?;
    let token = state.tokens.issue(user.id).map_err(|e| {
        log::error!("token signing failed: {}", e);
        error::internal_server_error(
            LoginError::Unknown,
            "login failed, please try again later".to_owned(),
        )
    })?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_owned(),
        token,
        user: UserModel::from_entity(&user),
    }))
}
