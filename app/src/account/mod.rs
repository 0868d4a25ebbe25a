//! Account identities and their credentials. Registering an account also
//! creates its wallet, in the same transaction, so a user without a
//! wallet (or the other way around) can never be observed.

use crate::credential::CredentialHash;
use crate::database::{self, Database};
use thiserror::Error;
use uuid::Uuid;

mod entities;

pub use entities::{Email, Id, User, Username, ValidationError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to hash credential")]
    Credential(#[source] bcrypt::BcryptError),
    #[error(transparent)]
    Storage(#[from] database::Unavailable),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately identical for an unknown username and a wrong
    /// password, so a caller cannot enumerate usernames.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] database::Unavailable),
}

/// Registers a new account and its (empty) wallet. Uniqueness of the
/// username and email is decided by the storage constraints at commit
/// time; a concurrent registration with the same identity resolves to
/// exactly one winner.
pub async fn create(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Id, Error> {
    let username = Username::parse(username)?;
    let email = Email::parse(email)?;
    entities::validate_password(password)?;
    let credential = CredentialHash::generate(password).map_err(Error::Credential)?;

    let user_id = Id(Uuid::new_v4());
    queries::insert_with_wallet(db, user_id, &username, &email, &credential).await?;
    log::info!("new account registered: {} ({:?})", username.0, user_id);
    Ok(user_id)
}

/// Verifies a username/password pair and returns the public view of the
/// account on success.
pub async fn authenticate(
    db: &Database,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    match queries::get_with_credential(db, username.trim()).await? {
        Some((user, credential)) if credential.verify(password) => Ok(user),
        Some(_) => Err(AuthError::InvalidCredentials),
        None => {
            // Burn the same hashing work when the username is unknown, so
            // response timing does not reveal which field was wrong.
            let _ = CredentialHash::generate(password);
            Err(AuthError::InvalidCredentials)
        }
    }
}

pub async fn get(db: &Database, id: Id) -> Result<Option<User>, database::Unavailable> {
    queries::get(db, id).await
}

mod queries {
    use super::{Email, Id, User, Username};
    use crate::credential::CredentialHash;
    use crate::database::{self, Database};
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    pub(super) async fn insert_with_wallet(
        db: &Database,
        user_id: Id,
        username: &Username,
        email: &Email,
        credential: &CredentialHash,
    ) -> Result<(), super::Error> {
        let mut data_tx = db.begin().await.map_err(database::Unavailable::from)?;
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(user_id.0)
        .bind(&username.0)
        .bind(&email.0)
        .bind(credential.as_str())
        .bind(Utc::now())
        .execute(&mut *data_tx)
        .await
        .map_err(classify)?;
        sqlx::query("INSERT INTO wallets (id, user_id, balance_cents, created) VALUES (?1, ?2, 0, ?3)")
            .bind(Uuid::new_v4())
            .bind(user_id.0)
            .bind(Utc::now())
            .execute(&mut *data_tx)
            .await
            .map_err(classify)?;
        data_tx.commit().await.map_err(database::Unavailable::from)?;
        Ok(())
    }

    pub(super) async fn get(
        db: &Database,
        id: Id,
    ) -> Result<Option<User>, database::Unavailable> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, created FROM users WHERE id = ?1",
        )
        .bind(id.0)
        .fetch_optional(db)
        .await?
        .map(|row| row.into_entity()))
    }

    pub(super) async fn get_with_credential(
        db: &Database,
        username: &str,
    ) -> Result<Option<(User, CredentialHash)>, database::Unavailable> {
        Ok(sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, email, password_hash, created FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(db)
        .await?
        .map(|row| row.into_entity()))
    }

    /// Maps storage-constraint failures onto the identity conflict they
    /// represent. SQLite names the violated column in the message, e.g.
    /// "UNIQUE constraint failed: users.username".
    fn classify(e: sqlx::Error) -> super::Error {
        if let Some(db_err) = e.as_database_error() {
            if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                let message = db_err.message();
                if message.contains("users.username") {
                    return super::Error::DuplicateUsername;
                }
                if message.contains("users.email") {
                    return super::Error::DuplicateEmail;
                }
            }
        }
        super::Error::Storage(e.into())
    }

    #[derive(sqlx::FromRow, Debug)]
    struct UserRow {
        id: Uuid,
        username: String,
        email: String,
        created: DateTime<Utc>,
    }

    impl UserRow {
        fn into_entity(self) -> User {
            User {
                id: Id(self.id),
                username: Username(self.username),
                email: Email(self.email),
                created: self.created,
            }
        }
    }

    #[derive(sqlx::FromRow, Debug)]
    struct CredentialRow {
        id: Uuid,
        username: String,
        email: String,
        password_hash: String,
        created: DateTime<Utc>,
    }

    impl CredentialRow {
        fn into_entity(self) -> (User, CredentialHash) {
            (
                User {
                    id: Id(self.id),
                    username: Username(self.username),
                    email: Email(self.email),
                    created: self.created,
                },
                CredentialHash::from_stored(self.password_hash),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::CountRow;
    use crate::test_support::test_db;

    #[tokio::test]
    async fn create_returns_a_public_view_without_credentials() {
        let (db, _dir) = test_db().await;
        let id = create(&db, "alice", "Alice@Example.com", "Passw0rd1")
            .await
            .unwrap();

        let user = get(&db, id).await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username.0, "alice");
        // Email is normalized to lowercase at registration.
        assert_eq!(user.email.0, "alice@example.com");
    }

    #[tokio::test]
    async fn rejects_invalid_inputs_with_the_violated_rule() {
        let (db, _dir) = test_db().await;
        let err = create(&db, "ab", "x@x.com", "Passw0rd1").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidUsername)
        ));

        let err = create(&db, "alice", "nonsense", "Passw0rd1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidEmail)));

        let err = create(&db, "alice", "a@b.com", "password")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::PasswordNeedsUppercase)
        ));
    }

    #[tokio::test]
    async fn duplicate_username_loses_even_when_racing() {
        let (db, _dir) = test_db().await;
        let (a, b) = tokio::join!(
            create(&db, "alice", "first@example.com", "Passw0rd1"),
            create(&db, "alice", "second@example.com", "Passw0rd1"),
        );

        // Exactly one registration wins, the other sees the conflict.
        assert!(a.is_ok() != b.is_ok());
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser.unwrap_err(), Error::DuplicateUsername));

        let users = sqlx::query_as::<_, CountRow>("SELECT COUNT(*) AS count FROM users")
            .fetch_one(&db)
            .await
            .unwrap();
        let wallets = sqlx::query_as::<_, CountRow>("SELECT COUNT(*) AS count FROM wallets")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(users.count, 1);
        assert_eq!(wallets.count, 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_reported_as_such() {
        let (db, _dir) = test_db().await;
        create(&db, "alice", "same@example.com", "Passw0rd1")
            .await
            .unwrap();
        let err = create(&db, "bob", "Same@Example.com", "Passw0rd1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail));
    }

    #[tokio::test]
    async fn authenticate_never_reveals_which_field_was_wrong() {
        let (db, _dir) = test_db().await;
        create(&db, "alice", "alice@example.com", "Passw0rd1")
            .await
            .unwrap();

        let user = authenticate(&db, "alice", "Passw0rd1").await.unwrap();
        assert_eq!(user.username.0, "alice");

        let wrong_password = authenticate(&db, "alice", "Passw0rd2").await.unwrap_err();
        let unknown_user = authenticate(&db, "mallory", "Passw0rd1").await.unwrap_err();
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }
}
