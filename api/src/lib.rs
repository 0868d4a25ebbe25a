//! This library contains definitions for the API layer.

use app::database::Database;
use app::ledger;
use rocket::{Build, Rocket};
use state::RocketState;

mod access;
mod error;
mod rate_limit;
mod routes;
mod state;

pub use access::TokenSigner;
pub use rate_limit::{RateLimit, RateLimits};

pub fn register(
    rocket: Rocket<Build>,
    db: Database,
    limits: ledger::Limits,
    rate_limits: RateLimits,
    tokens: TokenSigner,
) -> Rocket<Build> {
    routes::register(
        rocket,
        RocketState {
            db,
            limits,
            rate_limits,
            tokens,
        },
    )
}
