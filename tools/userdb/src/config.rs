//! Loader configuration
//!
//! Defaults with CLI overrides. Nothing is read from the environment.

use std::path::{Path, PathBuf};

use crate::core::store::{normalise_db_path, DEFAULT_DB_FILE};

/// Paths the loader works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Store file, or a directory to place `database.db` in
    pub db_path: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
        }
    }
}

impl LoaderConfig {
    /// Defaults overridden by whatever was passed on the command line
    pub fn from_args(db_path: Option<&Path>) -> Self {
        let mut config = Self::default();
        if let Some(db_path) = db_path {
            config.db_path = db_path.to_path_buf();
        }
        config
    }

    /// Concrete store file
    pub fn store_file(&self) -> PathBuf {
        normalise_db_path(&self.db_path)
    }
}
