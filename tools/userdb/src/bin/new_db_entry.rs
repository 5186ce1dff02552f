//! new-db-entry - replace the users table with a YAML mapping
//!
//! The YAML document maps each username to its list of projects:
//!
//! ```yaml
//! alice@cluster.example.edu: [cpu-alloc-2024, gpu-alloc-2024]
//! bob@cluster.example.edu: [scratch]
//! ```

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::debug;
use userdb::utils::{check_store_status, init_logging, print_rows, with_kind};
use userdb::{LoaderConfig, MappingSource, SyncMode, UserLoader};

#[derive(Parser)]
#[command(name = "new-db-entry")]
#[command(about = "Replace the users table with a username → projects YAML mapping")]
#[command(version)]
struct Cli {
    /// YAML file mapping usernames to project lists (nothing happens without it)
    path: Option<PathBuf>,

    /// Store file or directory (default: ./database.db)
    #[arg(long = "db")]
    db_path: Option<PathBuf>,

    /// Parse and report the mapping without touching the store
    #[arg(long)]
    check: bool,

    /// Print the stored rows afterwards
    #[arg(short, long)]
    list: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose);

    let config = LoaderConfig::from_args(cli.db_path.as_deref());
    let loader = UserLoader::new(config.store_file());

    if let Some(path) = cli.path.as_ref() {
        let source = MappingSource::File(path.clone());

        if cli.check {
            let mapping = loader
                .check(&source)
                .map_err(|e| with_kind(e, format!("invalid mapping {}", path.display())))?;
            println!(
                "{} {} users in {}",
                "✓ Valid:".bright_green(),
                mapping.len(),
                path.display()
            );
            return Ok(());
        }

        let stats = loader
            .sync(&source, SyncMode::Replace)
            .await
            .map_err(|e| with_kind(e, format!("failed to load users from {}", path.display())))?;
        println!(
            "{} {} users into {} ({} removed)",
            "✓ Synced".bright_green(),
            stats.items_synced,
            loader.db_path().display(),
            stats.items_deleted
        );
    } else {
        debug!("No input file given, nothing to do");
    }

    if cli.list {
        let status = check_store_status(loader.db_path())
            .await
            .map_err(|e| with_kind(e, "failed to inspect store"))?;
        if !status.exists {
            println!("{} {}", "No store at".yellow(), loader.db_path().display());
            return Ok(());
        }

        let rows = loader
            .list()
            .await
            .map_err(|e| with_kind(e, "failed to read users"))?;
        println!("{} ({} rows)", "Users".bright_cyan(), rows.len());
        print_rows(&rows);
    }

    Ok(())
}
