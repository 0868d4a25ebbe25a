use crate::database::{self, Database};
use tempfile::TempDir;

/// A migrated SQLite database in a fresh temp dir. Keep the returned
/// `TempDir` alive for as long as the pool is in use.
pub(crate) async fn test_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}/test.db", dir.path().display());
    let db = database::connect(&url).await.unwrap();
    database::run_migrations(&db).await.unwrap();
    (db, dir)
}
