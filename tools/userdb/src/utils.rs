//! Utility functions for the userdb CLI

use colored::*;
use errors::{LoaderError, LoaderResult};
use std::path::Path;
use tracing::debug;

use crate::core::mapping::UserProjectRow;
use crate::core::{schema, syncer, UserStore};

/// Store status information
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub exists: bool,
    pub initialized: bool,
    pub row_count: Option<u64>,
}

/// Check store status without creating anything
pub async fn check_store_status(db_path: &Path) -> LoaderResult<StoreStatus> {
    debug!("Checking store status: {:?}", db_path);

    if !db_path.is_file() {
        return Ok(StoreStatus::default());
    }

    let mut store = UserStore::open_existing(db_path).await?;
    let status = if schema::users_table_exists(store.connection()).await? {
        StoreStatus {
            exists: true,
            initialized: true,
            row_count: Some(syncer::count_users(&mut store).await?),
        }
    } else {
        StoreStatus {
            exists: true,
            initialized: false,
            row_count: None,
        }
    };
    store.close().await?;

    Ok(status)
}

/// Initialize logging the same way for every binary
pub fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Wrap a loader error for `main`, prefixed with its kind
pub fn with_kind(err: LoaderError, what: impl std::fmt::Display) -> anyhow::Error {
    let kind = err.kind();
    let context = if err.is_busy() {
        format!("{}: {} (store is locked by another writer)", kind, what)
    } else {
        format!("{}: {}", kind, what)
    };
    anyhow::Error::new(err).context(context)
}

/// Print rows as `username  p1, p2`
pub fn print_rows(rows: &[UserProjectRow]) {
    let width = rows.iter().map(|r| r.username.len()).max().unwrap_or(0);
    for row in rows {
        let username = format!("{:<width$}", row.username, width = width);
        println!("  {}  {}", username.bright_yellow(), row.projects.join(", "));
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::core::{persist, SyncMode, UserProjectMap};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_of_missing_store() {
        let temp_dir = TempDir::new().unwrap();
        let status = check_store_status(&temp_dir.path().join("database.db"))
            .await
            .unwrap();
        assert_eq!(status, StoreStatus::default());
    }

    #[tokio::test]
    async fn test_status_counts_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("database.db");
        persist(&UserProjectMap::inline(), &db_path, SyncMode::Append)
            .await
            .unwrap();

        let status = check_store_status(&db_path).await.unwrap();
        assert!(status.exists && status.initialized);
        assert_eq!(status.row_count, Some(UserProjectMap::inline().len() as u64));
    }

    #[test]
    fn test_with_kind_prefixes_kind() {
        let err = LoaderError::StoreNotFound("database.db".into());
        let wrapped = with_kind(err, "cannot list database.db");
        assert_eq!(wrapped.to_string(), "StorageError: cannot list database.db");
    }

    #[tokio::test]
    async fn test_with_kind_reports_locked_store() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("database.db");
        persist(&UserProjectMap::inline(), &db_path, SyncMode::Append)
            .await
            .unwrap();

        let mut holder = UserStore::open(&db_path).await.unwrap();
        sqlx::query("BEGIN EXCLUSIVE")
            .execute(holder.connection())
            .await
            .unwrap();

        let err = persist(&UserProjectMap::inline(), &db_path, SyncMode::Append)
            .await
            .unwrap_err();
        let wrapped = with_kind(err, "cannot write database.db");
        assert!(wrapped.to_string().starts_with("StorageError: cannot write"));
        assert!(wrapped.to_string().contains("locked by another writer"));

        sqlx::query("ROLLBACK")
            .execute(holder.connection())
            .await
            .unwrap();
        holder.close().await.unwrap();
    }
}
