use super::{Migration, SimpleSqlMigration};

pub fn migration() -> impl Migration {
    SimpleSqlMigration {
        serial_number: 0,
        sql: vec![
            // Uniqueness of username and email is enforced here, at the
            // storage level. Duplicate registrations are detected by the
            // constraint at commit time, never by a prior read.
            r#"
            CREATE TABLE users (
                id BLOB PRIMARY KEY,
                username TEXT NOT NULL,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created TEXT NOT NULL
            )"#,
            r#"CREATE UNIQUE INDEX user_username ON users (username)"#,
            r#"CREATE UNIQUE INDEX user_email ON users (email)"#,
            // One wallet per user, created in the same transaction as the
            // user row. Balances are whole cents and can never go negative.
            r#"
            CREATE TABLE wallets (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL UNIQUE REFERENCES users (id),
                balance_cents BIGINT NOT NULL CHECK (balance_cents >= 0),
                created TEXT NOT NULL
            )"#,
        ],
    }
}
