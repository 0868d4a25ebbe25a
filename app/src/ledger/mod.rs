//! Wallet balances and the operations that mutate them.
//!
//! Every mutation is a single conditional `UPDATE ... RETURNING`
//! statement: the balance read, the guard against going negative, and
//! the write all happen inside one atomic storage operation. Two
//! concurrent deposits therefore both land (no lost update), and a debit
//! can never observe a stale balance.

use crate::account;
use crate::database::{self, Database};
use crate::money::Cents;
use thiserror::Error;

mod entities;

pub use entities::{Id, Wallet};

#[derive(Debug, Error)]
pub enum Error {
    #[error("wallet not found")]
    WalletNotFound,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error(transparent)]
    Storage(#[from] database::Unavailable),
}

/// Sanity ceiling for a single deposit.
#[derive(Debug)]
pub struct Limits {
    pub max_deposit: Cents,
}

impl Default for Limits {
    fn default() -> Self {
        // 1,000,000.00 units.
        Self {
            max_deposit: Cents(100_000_000),
        }
    }
}

pub async fn get(
    db: &Database,
    user_id: account::Id,
) -> Result<Option<Wallet>, database::Unavailable> {
    queries::get_by_user(db, user_id).await
}

/// Credits a wallet and returns the new balance. The amount must be
/// positive and within the configured ceiling.
pub async fn deposit(
    db: &Database,
    wallet_id: Id,
    amount: Cents,
    limits: &Limits,
) -> Result<Cents, Error> {
    if amount <= Cents::ZERO || amount > limits.max_deposit {
        return Err(Error::InvalidAmount);
    }
    adjust(db, wallet_id, amount).await
}

/// Applies a signed delta to a wallet and returns the new balance. A
/// negative delta that would take the balance below zero fails with
/// [`Error::InsufficientFunds`] and leaves the balance untouched; the
/// check and the write are the same atomic statement.
pub async fn adjust(db: &Database, wallet_id: Id, delta: Cents) -> Result<Cents, Error> {
    match queries::apply_delta(db, wallet_id, delta).await? {
        Some(balance) => Ok(balance),
        // The conditional update matched no row: either the wallet does
        // not exist or the guard rejected the delta. Wallets are never
        // deleted, so the follow-up existence check is race-free.
        None => {
            if queries::exists(db, wallet_id).await? {
                Err(Error::InsufficientFunds)
            } else {
                Err(Error::WalletNotFound)
            }
        }
    }
}

mod queries {
    use super::{Id, Wallet};
    use crate::account;
    use crate::database::{self, Database};
    use crate::money::Cents;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    pub(super) async fn get_by_user(
        db: &Database,
        user_id: account::Id,
    ) -> Result<Option<Wallet>, database::Unavailable> {
        Ok(sqlx::query_as::<_, WalletRow>(
            "SELECT id, user_id, balance_cents, created FROM wallets WHERE user_id = ?1",
        )
        .bind(user_id.0)
        .fetch_optional(db)
        .await?
        .map(|row| row.into_entity()))
    }

    pub(super) async fn apply_delta(
        db: &Database,
        id: Id,
        delta: Cents,
    ) -> Result<Option<Cents>, database::Unavailable> {
        Ok(sqlx::query_as::<_, BalanceRow>(
            r#"UPDATE wallets SET balance_cents = balance_cents + ?1
                WHERE id = ?2 AND balance_cents + ?1 >= 0
                RETURNING balance_cents"#,
        )
        .bind(delta.0)
        .bind(id.0)
        .fetch_optional(db)
        .await?
        .map(|row| Cents(row.balance_cents)))
    }

    pub(super) async fn exists(db: &Database, id: Id) -> Result<bool, database::Unavailable> {
        Ok(sqlx::query("SELECT id FROM wallets WHERE id = ?1")
            .bind(id.0)
            .fetch_optional(db)
            .await?
            .is_some())
    }

    #[derive(sqlx::FromRow, Debug)]
    struct BalanceRow {
        balance_cents: i64,
    }

    #[derive(sqlx::FromRow, Debug)]
    struct WalletRow {
        id: Uuid,
        user_id: Uuid,
        balance_cents: i64,
        created: DateTime<Utc>,
    }

    impl WalletRow {
        fn into_entity(self) -> Wallet {
            Wallet {
                id: Id(self.id),
                user_id: account::Id(self.user_id),
                balance: Cents(self.balance_cents),
                created: self.created,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use uuid::Uuid;

    async fn funded_wallet(db: &Database) -> Wallet {
        let user_id = crate::account::create(db, "alice", "alice@example.com", "Passw0rd1")
            .await
            .unwrap();
        get(db, user_id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn new_accounts_start_with_an_empty_wallet() {
        let (db, _dir) = test_db().await;
        let wallet = funded_wallet(&db).await;
        assert_eq!(wallet.balance, Cents::ZERO);
    }

    #[tokio::test]
    async fn deposit_returns_the_new_balance() {
        let (db, _dir) = test_db().await;
        let wallet = funded_wallet(&db).await;
        let limits = Limits::default();

        let balance = deposit(&db, wallet.id, Cents(5000), &limits).await.unwrap();
        assert_eq!(balance, Cents(5000));
        let balance = deposit(&db, wallet.id, Cents(1000), &limits).await.unwrap();
        assert_eq!(balance, Cents(6000));
    }

    #[tokio::test]
    async fn concurrent_deposits_are_never_lost() {
        let (db, _dir) = test_db().await;
        let wallet = funded_wallet(&db).await;
        let limits = Limits::default();

        deposit(&db, wallet.id, Cents(5000), &limits).await.unwrap();
        let (a, b) = tokio::join!(
            deposit(&db, wallet.id, Cents(1000), &limits),
            deposit(&db, wallet.id, Cents(2000), &limits),
        );
        a.unwrap();
        b.unwrap();

        let wallet = get(&db, wallet.user_id).await.unwrap().unwrap();
        assert_eq!(wallet.balance, Cents(8000));
    }

    #[tokio::test]
    async fn deposit_rejects_out_of_range_amounts() {
        let (db, _dir) = test_db().await;
        let wallet = funded_wallet(&db).await;
        let limits = Limits::default();

        for amount in [Cents::ZERO, Cents(-100), Cents(100_000_001)] {
            let err = deposit(&db, wallet.id, amount, &limits).await.unwrap_err();
            assert!(matches!(err, Error::InvalidAmount));
        }
        let wallet = get(&db, wallet.user_id).await.unwrap().unwrap();
        assert_eq!(wallet.balance, Cents::ZERO);
    }

    #[tokio::test]
    async fn deposit_to_unknown_wallet_fails() {
        let (db, _dir) = test_db().await;
        funded_wallet(&db).await;
        let err = deposit(&db, Id(Uuid::new_v4()), Cents(1000), &Limits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::WalletNotFound));
    }

    #[tokio::test]
    async fn over_debit_fails_and_leaves_the_balance_unchanged() {
        let (db, _dir) = test_db().await;
        let wallet = funded_wallet(&db).await;
        let limits = Limits::default();

        deposit(&db, wallet.id, Cents(3000), &limits).await.unwrap();
        let err = adjust(&db, wallet.id, Cents(-5000)).await.unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds));

        let wallet = get(&db, wallet.user_id).await.unwrap().unwrap();
        assert_eq!(wallet.balance, Cents(3000));

        let balance = adjust(&db, wallet.id, Cents(-3000)).await.unwrap();
        assert_eq!(balance, Cents::ZERO);
    }
}
