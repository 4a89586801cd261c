use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::CreateDbArgs;
use crate::failure::Failure;
use crate::schema::{GAME_TABLES, TableSpec, create_tables};
use crate::util::ensure_parent_directory;

pub fn run(args: CreateDbArgs) -> Result<()> {
    create_database(&args.db_path, args.force)?;
    println!("database created: {}", args.db_path.display());
    Ok(())
}

pub(crate) fn create_database(db_path: &Path, force: bool) -> Result<()> {
    create_database_with(db_path, force, &GAME_TABLES)
}

fn create_database_with(db_path: &Path, force: bool, tables: &[TableSpec]) -> Result<()> {
    let existed = db_path.exists();
    if existed && !force {
        return Err(anyhow!("{} already exists", db_path.display()).context(Failure::DatabaseExists));
    }

    prepare_destination(db_path, existed).context(Failure::Schema)?;

    info!(path = %db_path.display(), tables = tables.len(), "creating database");
    let outcome = initialize(db_path, tables);
    if outcome.is_err() {
        discard_partial_database(db_path);
    }
    outcome.context(Failure::Schema)
}

fn prepare_destination(db_path: &Path, replace: bool) -> Result<()> {
    ensure_parent_directory(db_path)?;

    if replace {
        fs::remove_file(db_path)
            .with_context(|| format!("failed to remove existing {}", db_path.display()))?;
        warn!(path = %db_path.display(), "removed existing database");
    }

    Ok(())
}

fn initialize(db_path: &Path, tables: &[TableSpec]) -> Result<()> {
    let mut connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    create_tables(&mut connection, tables)?;

    connection
        .close()
        .map_err(|(_, err)| err)
        .with_context(|| format!("failed to close {}", db_path.display()))
}

// The schema transaction was already rolled back; drop the empty file so the
// path is left as it was found.
fn discard_partial_database(db_path: &Path) {
    if !db_path.exists() {
        return;
    }
    if let Err(err) = fs::remove_file(db_path) {
        warn!(path = %db_path.display(), error = %err, "failed to remove partial database");
    }
}
