//! Scoped handle on the users store
//!
//! A single SQLite connection is opened per run. `close` releases it
//! explicitly; dropping the handle on an error path releases it as well.

use errors::{LoaderError, LoaderResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection, Sqlite, Transaction};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default store file, relative to the working directory
pub const DEFAULT_DB_FILE: &str = "database.db";

/// How long a writer waits on a locked store before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open connection to the store file
pub struct UserStore {
    conn: SqliteConnection,
    path: PathBuf,
}

impl UserStore {
    /// Open the store for writing, creating the file if missing
    pub async fn open(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref().to_path_buf();

        // Ensure data directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LoaderError::StoreLocation {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            // Rollback journal keeps the file readable by read-only openers
            .journal_mode(SqliteJournalMode::Delete)
            .busy_timeout(BUSY_TIMEOUT)
            .connect()
            .await?;

        info!("Store opened: {}", path.display());
        Ok(Self { conn, path })
    }

    /// Open an existing store read-only; never creates the file
    pub async fn open_existing(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(LoaderError::StoreNotFound(path));
        }

        let conn = SqliteConnectOptions::new()
            .filename(&path)
            .read_only(true)
            .busy_timeout(BUSY_TIMEOUT)
            .connect()
            .await?;

        debug!("Store opened read-only: {}", path.display());
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Borrow the underlying connection
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Start a transaction; it rolls back unless committed
    pub async fn begin(&mut self) -> LoaderResult<Transaction<'_, Sqlite>> {
        Ok(self.conn.begin().await?)
    }

    /// Release the connection
    pub async fn close(self) -> LoaderResult<()> {
        self.conn.close().await?;
        debug!("Store closed: {}", self.path.display());
        Ok(())
    }
}

/// Resolve a user supplied location into a concrete store file.
///
/// A directory gets the default file name appended; anything else is used
/// as the file itself.
pub fn normalise_db_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        input.join(DEFAULT_DB_FILE)
    } else {
        input.to_path_buf()
    }
}
