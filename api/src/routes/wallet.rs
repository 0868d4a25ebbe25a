//! Wallet lookup and deposits.

use chrono::{DateTime, Utc};
use rocket::{get, post, serde::json::Json, State};
use rocket_okapi::openapi;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use app::ledger;
use app::money::Cents;

use crate::{
    access,
    error::{self, JsonError, JsonResult},
    state::RocketState,
};

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct WalletModel {
    /// Unique wallet identifier.
    id: Uuid,
    /// Identifier of the owning account.
    user_id: Uuid,
    /// Current balance as an exact decimal string, e.g. "50.00".
    balance: String,
    /// Wallet creation time.
    created_at: DateTime<Utc>,
}

impl WalletModel {
    fn from_entity(wallet: &ledger::Wallet) -> Self {
        Self {
            id: wallet.id.0,
            user_id: wallet.user_id.0,
            balance: wallet.balance.to_decimal().to_string(),
            created_at: wallet.created,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct WalletResponse {
    wallet: WalletModel,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum WalletError {
    /// Storage is temporarily unavailable, retry later.
    ServiceUnavailable,
}

/// Get the authenticated account's wallet.
#[openapi(tag = "Wallet")]
#[get("/wallet")]
pub(super) async fn get(
    guard: access::AccountGuard,
    state: &State<RocketState>,
) -> Result<Option<Json<WalletResponse>>, JsonError<WalletError>> {
    let wallet = ledger::get(&state.db, guard.account_id())
        .await
        .map_err(|e| {
            log::error!("wallet lookup failed: {}", e);
            error::service_unavailable(WalletError::ServiceUnavailable)
        })?;
    Ok(wallet.map(|wallet| {
        Json(WalletResponse {
            wallet: WalletModel::from_entity(&wallet),
        })
    }))
}

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct DepositRequest {
    /// Identifier of the wallet to credit; must belong to the
    /// authenticated account.
    wallet_id: Uuid,
    /// Amount to deposit as a decimal string with at most two decimal
    /// places, e.g. "50.00".
    amount: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct DepositResponse {
    message: String,
    /// Balance after the deposit, as an exact decimal string.
    new_balance: String,
    /// The credited amount, echoed back.
    amount_deposited: String,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum DepositError {
    /// The amount is not a positive decimal within the deposit ceiling.
    InvalidAmount,
    /// No such wallet on this account.
    WalletNotFound,
    /// Storage is temporarily unavailable, retry later.
    ServiceUnavailable,
}

/// Deposit funds into the authenticated account's wallet.
#[openapi(tag = "Wallet")]
#[post("/wallet/deposit", data = "<req>")]
pub(super) async fn deposit(
    guard: access::AccountGuard,
    state: &State<RocketState>,
    req: Json<DepositRequest>,
) -> JsonResult<DepositResponse, DepositError> {
    let amount = Decimal::from_str(&req.amount)
        .ok()
        .and_then(Cents::from_decimal)
        .ok_or_else(|| {
            error::bad_request(
                DepositError::InvalidAmount,
                "amount is not a valid decimal amount".to_owned(),
            )
        })?;

    // A wallet id belonging to someone else is indistinguishable from an
    // unknown one.
    let wallet = ledger::get(&state.db, guard.account_id())
        .await
        .map_err(|e| {
            log::error!("wallet lookup failed: {}", e);
            error::service_unavailable(DepositError::ServiceUnavailable)
        })?
        .filter(|wallet| wallet.id.0 == req.wallet_id)
        .ok_or_else(|| {
            error::not_found(DepositError::WalletNotFound, "wallet not found".to_owned())
        })?;

    let new_balance = ledger::deposit(&state.db, wallet.id, amount, &state.limits)
        .await
        .map_err(|e| match e {
            ledger::Error::InvalidAmount | ledger::Error::InsufficientFunds => error::bad_request(
                DepositError::InvalidAmount,
                "amount must be positive and within the deposit ceiling".to_owned(),
            ),
            ledger::Error::WalletNotFound => {
                error::not_found(DepositError::WalletNotFound, "wallet not found".to_owned())
            }
            ledger::Error::Storage(e) => {
                log::error!("deposit failed: {}", e);
                error::service_unavailable(DepositError::ServiceUnavailable)
            }
        })?;

    log::info!(
        "deposit successful: wallet {:?}, amount {:?}",
        wallet.id,
        amount
    );
    Ok(Json(DepositResponse {
        message: "Deposit successful".to_owned(),
        new_balance: new_balance.to_decimal().to_string(),
        amount_deposited: amount.to_decimal().to_string(),
    }))
}
