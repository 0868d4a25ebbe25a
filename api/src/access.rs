//! Session tokens and the request guard that enforces them.
//!
//! A successful login yields a signed, expiring JWT; possession of a
//! valid token proves the account identity for the routes behind
//! [`AccountGuard`]. The unauthenticated registration and login routes
//! are throttled per client address via [`ClientThrottle`] instead.

use app::account;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use okapi::openapi3::{Object, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket::{
    async_trait,
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use rocket_okapi::{
    gen::OpenApiGenerator,
    request::{OpenApiFromRequest, RequestHeaderInput},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::state::RocketState;

#[derive(Debug, Error)]
#[error("access denied")]
pub struct AccessDenied;

#[derive(Debug, Error)]
pub enum Error {
    #[error("access denied")]
    AccessDenied(#[from] AccessDenied),
    #[error("rate limit exceeded")]
    RateLimited,
}

const AUTH_HEADER: &str = "Authorization";

/// Issues and verifies the HS256-signed session tokens handed out at
/// login.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub(crate) fn issue(
        &self,
        account_id: account::Id,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account_id.0,
            iat: now,
            exp: now + self.ttl_secs,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
    }

    pub(crate) fn verify(&self, token: &str) -> Result<account::Id, AccessDenied> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| account::Id(data.claims.sub))
            .map_err(|_| AccessDenied)
    }
}

/// Proof that the request carried a valid session token. Also applies
/// the per-account rate window.
pub struct AccountGuard(account::Id);

impl AccountGuard {
    pub fn account_id(&self) -> account::Id {
        self.0
    }
}

#[async_trait]
impl<'r> FromRequest<'r> for AccountGuard {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let state = req.rocket().state::<RocketState>().unwrap();
        match bearer_token(req) {
            Some(token) => match state.tokens.verify(token) {
                Ok(account_id) => {
                    if state.rate_limits.per_account.limit(account_id) {
                        log::info!("rate limiting account {:?}", account_id);
                        Outcome::Error((Status::TooManyRequests, Error::RateLimited))
                    } else {
                        Outcome::Success(AccountGuard(account_id))
                    }
                }
                Err(e) => Outcome::Error((Status::Unauthorized, e.into())),
            },
            None => Outcome::Error((Status::Unauthorized, AccessDenied.into())),
        }
    }
}

/// Per-client-address throttle for the routes that have no account to
/// key on yet. Requests with no resolvable client address are let
/// through.
pub struct ClientThrottle;

#[async_trait]
impl<'r> FromRequest<'r> for ClientThrottle {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let state = req.rocket().state::<RocketState>().unwrap();
        match req.client_ip() {
            Some(ip) if state.rate_limits.per_client.limit(ip) => {
                log::info!("rate limiting client {}", ip);
                Outcome::Error((Status::TooManyRequests, Error::RateLimited))
            }
            _ => Outcome::Success(ClientThrottle),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for AccountGuard {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some(format!(
                "Requires a session token from /api/login: \"{}: Bearer <token>\".",
                AUTH_HEADER
            )),
            data: SecuritySchemeData::Http {
                scheme: "bearer".to_owned(),
                bearer_format: Some("JWT".to_owned()),
            },
            extensions: Object::default(),
        };
        let mut security_req = SecurityRequirement::new();
        security_req.insert(AUTH_HEADER.to_owned(), Vec::new());
        Ok(RequestHeaderInput::Security(
            AUTH_HEADER.to_owned(),
            security_scheme,
            security_req,
        ))
    }
}

impl<'a> OpenApiFromRequest<'a> for ClientThrottle {
    fn from_request_input(
        _: &mut OpenApiGenerator,
        _: String,
        _: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

fn bearer_token<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    req.headers().get_one(AUTH_HEADER)?.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        let signer = TokenSigner::new("secret", 3600);
        let account_id = account::Id(Uuid::new_v4());
        let token = signer.issue(account_id).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), account_id);
    }

    #[test]
    fn tokens_from_another_key_are_rejected() {
        let signer = TokenSigner::new("secret", 3600);
        let other = TokenSigner::new("other-secret", 3600);
        let token = other.issue(account::Id(Uuid::new_v4())).unwrap();
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        // Expired well past jsonwebtoken's default leeway.
        let signer = TokenSigner::new("secret", -600);
        let token = signer.issue(account::Id(Uuid::new_v4())).unwrap();
        assert!(signer.verify(&token).is_err());
    }
}
