use std::time::Duration;

use app::database::{self, run_migrations, seed_development_data};
use app::ledger;
use app::money::Cents;
use rocket::{launch, Build, Rocket};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default = "default_database_url")]
    database_url: String,
    session: SessionConfig,
    #[serde(default)]
    limits: LimitsConfig,
    #[serde(default)]
    rate_limit: RateLimitConfig,
}

fn default_database_url() -> String {
    "sqlite://artist_platform.db".to_owned()
}

#[derive(Debug, Deserialize)]
struct SessionConfig {
    secret: String,
    #[serde(default = "default_session_ttl")]
    ttl_secs: i64,
}

fn default_session_ttl() -> i64 {
    24 * 60 * 60
}

#[derive(Debug, Deserialize)]
struct LimitsConfig {
    max_deposit_cents: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_deposit_cents: ledger::Limits::default().max_deposit.0,
        }
    }
}

impl LimitsConfig {
    fn into_limits(self) -> ledger::Limits {
        ledger::Limits {
            max_deposit: Cents(self.max_deposit_cents),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RateLimitConfig {
    limit: usize,
    span: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            span: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    fn into_rate_limits(self) -> api::RateLimits {
        api::RateLimits::new(
            api::RateLimit::new(self.limit, self.span),
            api::RateLimit::new(self.limit, self.span),
        )
    }
}

#[launch]
async fn rocket() -> _ {
    start_server().await
}

async fn start_server() -> Rocket<Build> {
    env_logger::init();

    let rocket = Rocket::build();
    let config: Config = rocket.figment().extract().unwrap();

    let db = database::connect(&config.database_url).await.unwrap();
    run_migrations(&db).await.unwrap();
    #[cfg(debug_assertions)]
    seed_development_data(&db).await.unwrap();

    api::register(
        rocket,
        db,
        config.limits.into_limits(),
        config.rate_limit.into_rate_limits(),
        api::TokenSigner::new(&config.session.secret, config.session.ttl_secs),
    )
}
