//! seed-users - append the built-in seed accounts to the users table
//!
//! Every seeded account gets the same project list. Nothing is cleared
//! first, so running this twice leaves each account in the table twice.

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use userdb::utils::{init_logging, with_kind};
use userdb::{LoaderConfig, MappingSource, SyncMode, UserLoader};

#[derive(Parser)]
#[command(name = "seed-users")]
#[command(about = "Append the built-in seed accounts to the users table")]
#[command(version)]
struct Cli {
    /// Store file or directory (default: ./database.db)
    #[arg(long = "db")]
    db_path: Option<PathBuf>,

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

    let stats = loader
        .sync(&MappingSource::Inline, SyncMode::Append)
        .await
        .map_err(|e| with_kind(e, format!("failed to seed {}", loader.db_path().display())))?;

    println!(
        "{} {} users into {}",
        "✓ Seeded".bright_green(),
        stats.items_synced,
        loader.db_path().display()
    );
    Ok(())
}
