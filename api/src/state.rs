use app::{database::Database, ledger};

use crate::access::TokenSigner;
use crate::rate_limit::RateLimits;

pub struct RocketState {
    pub db: Database,
    pub limits: ledger::Limits,
    pub rate_limits: RateLimits,
    pub tokens: TokenSigner,
}
