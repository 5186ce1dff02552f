//! Loader core - users table management
//!
//! Ties the mapping sources to the store: parse first, then open the store
//! and write everything in one transaction.

use errors::LoaderResult;
use std::path::{Path, PathBuf};
use tracing::info;

// Module declarations
pub mod mapping;
pub mod schema;
pub mod store;
pub mod syncer;

// Re-export key types
pub use mapping::{load_mapping, MappingSource, UserProjectMap, UserProjectRow};
pub use store::UserStore;
pub use syncer::{persist, SyncMode, SyncResult, UserSyncer};

/// Users table loader bound to one store file
pub struct UserLoader {
    /// Store file
    db_path: PathBuf,
}

impl UserLoader {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Parse the source without touching the store
    pub fn check(&self, source: &MappingSource) -> LoaderResult<UserProjectMap> {
        load_mapping(source)
    }

    /// Load the mapping and write it to the store
    ///
    /// The source is fully parsed before the store is opened, so a bad input
    /// document never mutates the table.
    pub async fn sync(
        &self,
        source: &MappingSource,
        mode: SyncMode,
    ) -> LoaderResult<SyncResult> {
        let mapping = load_mapping(source)?;
        info!("Loaded {} users", mapping.len());

        UserSyncer::new(&self.db_path).persist(&mapping, mode).await
    }

    /// Read back every stored row; read-only
    pub async fn list(&self) -> LoaderResult<Vec<UserProjectRow>> {
        let mut store = UserStore::open_existing(&self.db_path).await?;
        let rows = if schema::users_table_exists(store.connection()).await? {
            syncer::fetch_users(&mut store).await
        } else {
            Ok(Vec::new())
        };
        store.close().await?;
        rows
    }
}
