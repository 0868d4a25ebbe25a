use crate::account;
use crate::money::Cents;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(pub Uuid);

/// The single balance-holding record owned by exactly one user. Created
/// together with its owner and never deleted, so its only observable
/// transition is the balance changing.
#[derive(Debug)]
pub struct Wallet {
    pub id: Id,
    pub user_id: account::Id,
    pub balance: Cents,
    pub created: DateTime<Utc>,
}
