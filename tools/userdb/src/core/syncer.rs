//! Users table synchronization
//!
//! Writes a [`UserProjectMap`] into the store. The clear step (replace mode)
//! and all inserts share one transaction: either every row lands or the
//! table is left exactly as it was.

use errors::{LoaderError, LoaderResult};
use sqlx::{Sqlite, Transaction};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::mapping::{UserProjectMap, UserProjectRow};
use super::schema;
use super::store::UserStore;

const INSERT_USER: &str = "INSERT INTO users (username, projects) VALUES (?, ?)";

/// How existing rows are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Delete every row first; the table ends up equal to the mapping
    Replace,
    /// Insert only; repeated runs duplicate usernames
    Append,
}

/// Result of a sync operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Number of rows inserted
    pub items_synced: usize,
    /// Number of rows removed by the clear step
    pub items_deleted: usize,
}

/// Encode a project list as a JSON array string
pub fn encode_projects(projects: &[String]) -> LoaderResult<String> {
    Ok(serde_json::to_string(projects)?)
}

/// Decode a stored `projects` value back into the original sequence
pub fn decode_projects(username: &str, raw: &str) -> LoaderResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| LoaderError::CorruptProjects {
        username: username.to_string(),
        error: e.to_string(),
    })
}

/// Users table syncer
pub struct UserSyncer {
    db_path: PathBuf,
}

impl UserSyncer {
    /// Create a new syncer
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Persist the mapping into the store
    ///
    /// @input mapping: &UserProjectMap - Rows to write, in iteration order
    /// @input mode: SyncMode - Replace (clear first) or Append
    /// @output `LoaderResult<SyncResult>` - Rows inserted/deleted
    /// @throws LoaderError (storage kind) - Store cannot be opened, locked, or write rejected
    /// @side-effects Creates the store file and `users` table when missing
    /// @transaction Full transaction - all or nothing
    pub async fn persist(
        &self,
        mapping: &UserProjectMap,
        mode: SyncMode,
    ) -> LoaderResult<SyncResult> {
        let mut store = UserStore::open(&self.db_path).await?;

        match sync_users(&mut store, mapping, mode).await {
            Ok(stats) => {
                store.close().await?;
                Ok(stats)
            },
            Err(e) => {
                if let Err(close_err) = store.close().await {
                    debug!("Close after failed sync: {}", close_err);
                }
                Err(e)
            },
        }
    }
}

/// Persist `mapping` into the store at `store_location`
pub async fn persist(
    mapping: &UserProjectMap,
    store_location: impl AsRef<Path>,
    mode: SyncMode,
) -> LoaderResult<SyncResult> {
    UserSyncer::new(store_location).persist(mapping, mode).await
}

/// Write the mapping through an already open store
pub async fn sync_users(
    store: &mut UserStore,
    mapping: &UserProjectMap,
    mode: SyncMode,
) -> LoaderResult<SyncResult> {
    schema::ensure_schema(store.connection()).await?;

    let mut stats = SyncResult::default();
    let mut tx = store.begin().await?;

    if mode == SyncMode::Replace {
        let deleted = sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
        stats.items_deleted = deleted.rows_affected() as usize;
        debug!("Cleared {} rows", stats.items_deleted);
    }

    for row in mapping {
        insert_user(&mut tx, row).await?;
        stats.items_synced += 1;
    }

    // Dropping `tx` on any early return above rolls the batch back
    tx.commit().await?;

    // Rows are committed at this point; a failed check must not fail the run
    if mode == SyncMode::Append && stats.items_synced > 0 {
        if let Err(e) = warn_on_duplicates(store).await {
            warn!("Duplicate check skipped: {}", e);
        }
    }

    info!(
        "Users: {} synced, {} deleted",
        stats.items_synced, stats.items_deleted
    );
    Ok(stats)
}

async fn insert_user(
    tx: &mut Transaction<'_, Sqlite>,
    row: &UserProjectRow,
) -> LoaderResult<()> {
    let projects = encode_projects(&row.projects)?;
    debug!("Insert {} -> {}", row.username, projects);

    sqlx::query(INSERT_USER)
        .bind(&row.username)
        .bind(&projects)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn warn_on_duplicates(store: &mut UserStore) -> LoaderResult<()> {
    let duplicated: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM (SELECT username FROM users GROUP BY username HAVING COUNT(*) > 1)",
    )
    .fetch_one(store.connection())
    .await?;

    if duplicated > 0 {
        warn!("{} usernames now have more than one row", duplicated);
    }
    Ok(())
}

/// Read every row back in insertion order
pub async fn fetch_users(store: &mut UserStore) -> LoaderResult<Vec<UserProjectRow>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT username, projects FROM users ORDER BY rowid")
            .fetch_all(store.connection())
            .await?;

    let mut users = Vec::with_capacity(rows.len());
    for (username, raw) in rows {
        let projects = decode_projects(&username, &raw)?;
        users.push(UserProjectRow { username, projects });
    }
    Ok(users)
}

/// Number of rows in the users table
pub async fn count_users(store: &mut UserStore) -> LoaderResult<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(store.connection())
        .await?;
    Ok(count as u64)
}
