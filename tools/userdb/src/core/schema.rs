//! Database schema initialization
//!
//! The store carries a single `users` table. Creation is idempotent so every
//! run can call it before touching rows.

use errors::LoaderResult;
use sqlx::SqliteConnection;
use tracing::debug;

/// Table holding one row per username
pub const USERS_TABLE: &str = "users";

/// `projects` holds a JSON array of project names. No uniqueness constraint
/// on `username`: append runs may insert the same account twice.
pub const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        username TEXT NOT NULL,
        projects TEXT NOT NULL
    )
"#;

/// Create the `users` table if it does not exist yet
pub async fn ensure_schema(conn: &mut SqliteConnection) -> LoaderResult<()> {
    sqlx::query(CREATE_USERS_TABLE).execute(&mut *conn).await?;
    debug!("Schema ready: {}", USERS_TABLE);
    Ok(())
}

/// Check whether the `users` table exists
pub async fn users_table_exists(conn: &mut SqliteConnection) -> LoaderResult<bool> {
    let exists: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(USERS_TABLE)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(exists.is_some())
}
