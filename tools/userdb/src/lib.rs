//! userdb - users table loader
//!
//! Populates the `users` table of a local SQLite store with a mapping from
//! username to the projects that account may charge. Two entry points share
//! this library:
//!
//! - `new-db-entry <file>` replaces the table with the contents of a YAML file
//! - `seed-users` appends the fixed seed accounts

pub mod config;
pub mod core;
pub mod utils;

pub use crate::config::LoaderConfig;
pub use crate::core::{
    load_mapping, persist, MappingSource, SyncMode, SyncResult, UserLoader, UserProjectMap,
    UserProjectRow, UserStore,
};
pub use errors::{ErrorKind, LoaderError, LoaderResult};
