use std::path::PathBuf;
use std::time::Duration;

use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use crate::config::{NameMatching, StoreConfig};
use crate::db::{Store, run_pending_migrations, set_foreign_keys};
use crate::models::User;

/// Creates a synchronous in-memory SQLite database connection for unit tests.
///
/// This function returns a `diesel::SqliteConnection` connected to an
/// in-memory SQLite database, runs all embedded Diesel migrations, and enables
/// foreign key support. This is ideal for direct Diesel queries in
/// synchronous test code.
///
/// Each call to this function returns a new, independent in-memory database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn).expect("Failed to enable foreign keys");
    run_pending_migrations(&mut conn).expect("Failed to run pending migrations");
    conn
}

/// Creates a [`Store`] backed by a uniquely named shared in-memory database.
///
/// The pool is capped at a single connection: shared-cache in-memory
/// databases lock whole tables, so concurrent writers would fail with
/// `SQLITE_LOCKED` instead of waiting. Use [`TempFileStore`] to exercise
/// real concurrency.
pub fn setup_test_store() -> Store {
    setup_test_store_with(NameMatching::Exact)
}

pub fn setup_test_store_with(name_matching: NameMatching) -> Store {
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());
    let config = StoreConfig::new(unique_db_name)
        .with_pool_size(1)
        .with_name_matching(name_matching);
    Store::open(&config).expect("Failed to open in-memory test store")
}

/// A file-backed [`Store`] in the system temp directory, removed on drop.
pub struct TempFileStore {
    pub store: Store,
    path: PathBuf,
}

impl TempFileStore {
    pub fn new(pool_size: u32) -> Self {
        let path = std::env::temp_dir().join(format!("access_core_test_{}.db", Uuid::new_v4()));
        let config = StoreConfig::new(path.to_string_lossy().to_string())
            .with_pool_size(pool_size)
            .with_busy_timeout(Duration::from_secs(30));
        let store = Store::open(&config).expect("Failed to open temp file store");
        TempFileStore { store, path }
    }
}

impl Drop for TempFileStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Inserts a user directly, panicking on failure.
pub fn create_test_user(conn: &mut SqliteConnection, email: &str) -> User {
    crate::orm::user::insert_user(conn, email).expect("Failed to create test user")
}
