use super::Database;
use crate::money::Cents;
use crate::{account, ledger};

/// Seeds two well-known accounts with funded wallets for local
/// development. Re-running against an already seeded database is a no-op.
pub async fn seed_development_data(db: &Database) -> anyhow::Result<()> {
    seed_account(db, "demo_listener", "listener@demo.test", Cents(10_000)).await?;
    seed_account(db, "demo_artist", "artist@demo.test", Cents(250_000)).await?;
    Ok(())
}

// Password is "Demo1234" for both seeded accounts.
async fn seed_account(
    db: &Database,
    username: &str,
    email: &str,
    opening_balance: Cents,
) -> anyhow::Result<()> {
    let user_id = match account::create(db, username, email, "Demo1234").await {
        Ok(user_id) => user_id,
        Err(account::Error::DuplicateUsername) => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if opening_balance > Cents::ZERO {
        let wallet = ledger::get(db, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("seeded account {} has no wallet", username))?;
        ledger::deposit(db, wallet.id, opening_balance, &ledger::Limits::default()).await?;
    }
    log::info!("seeded development account {}", username);
    Ok(())
}
