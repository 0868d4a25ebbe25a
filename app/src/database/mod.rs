use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;

pub use migrations::run_migrations;
pub use seeder::seed_development_data;

mod migrations;
mod seeder;

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub(crate) type Transaction = sqlx::Transaction<'static, sqlx::Sqlite>;

/// The storage backend failed or is unreachable.
///
/// Every operation in this crate is a single statement or a single
/// transaction, so nothing partial is ever committed and the whole
/// operation is safe to retry.
#[derive(Debug, Error)]
#[error("storage unavailable")]
pub struct Unavailable(#[from] sqlx::Error);

pub async fn connect(url: &str) -> Result<Database, Unavailable> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);
    Ok(SqlitePoolOptions::new().connect_with(options).await?)
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CountRow {
    pub count: i64,
}
