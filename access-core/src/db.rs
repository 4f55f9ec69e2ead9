use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::config::{NameMatching, StoreConfig};
use crate::error::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Enables foreign key support for SQLite connections.
///
/// Foreign keys are disabled by default in SQLite for backwards
/// compatibility, and the setting is per connection.
pub fn set_foreign_keys(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    conn.batch_execute("PRAGMA foreign_keys = ON")
}

/// Makes a connection wait up to `timeout` for a competing writer instead of
/// failing immediately with `SQLITE_BUSY`.
pub fn set_busy_timeout(
    conn: &mut SqliteConnection,
    timeout: Duration,
) -> Result<(), diesel::result::Error> {
    conn.batch_execute(&format!("PRAGMA busy_timeout = {}", timeout.as_millis()))
}

/// Runs all pending database migrations on the provided connection.
pub fn run_pending_migrations(conn: &mut SqliteConnection) -> Result<(), Error> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Migration(e.to_string()))?;
    for version in applied {
        info!("Applied migration {}", version);
    }
    Ok(())
}

/// Per-connection PRAGMAs applied whenever the pool opens a connection.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        set_foreign_keys(conn).map_err(diesel::r2d2::Error::QueryError)?;
        set_busy_timeout(conn, self.busy_timeout).map_err(diesel::r2d2::Error::QueryError)?;
        Ok(())
    }
}

/// Shared handle to the relational store.
///
/// One `Store` is built per process and handed to every component that needs
/// the database; cloning it only clones the pool handle.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    name_matching: NameMatching,
}

impl Store {
    /// Opens the pool described by `config` and brings the schema up to date.
    pub fn open(config: &StoreConfig) -> Result<Self, Error> {
        let manager = ConnectionManager::<SqliteConnection>::new(config.database_url.as_str());
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_customizer(Box::new(ConnectionOptions {
                busy_timeout: config.busy_timeout,
            }))
            .build(manager)?;

        let store = Store { pool, name_matching: config.name_matching };
        {
            let mut conn = store.conn()?;
            run_pending_migrations(&mut conn)?;
        }

        info!(
            "Opened store at {} (pool size {}, name matching {:?})",
            config.database_url, config.pool_size, config.name_matching
        );
        Ok(store)
    }

    pub fn name_matching(&self) -> NameMatching {
        self.name_matching
    }

    /// Checks a connection out of the pool.
    pub fn conn(&self) -> Result<DbConn, Error> {
        Ok(self.pool.get()?)
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken before `f` reads anything, so the constraint
    /// checks `f` performs and the writes that follow are serialized against
    /// every other writer. Any error rolls the whole unit back.
    pub fn write<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, Error>,
    {
        let mut conn = self.conn()?;
        let result = conn.immediate_transaction(f);
        if let Err(e) = &result {
            debug!("Write transaction rolled back: {}", e);
        }
        result
    }

    /// Runs `f` against a pooled connection without opening a write
    /// transaction.
    pub fn read<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, Error>,
    {
        let mut conn = self.conn()?;
        f(&mut *conn)
    }
}
