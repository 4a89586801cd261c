use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::cli::ImportItemsArgs;
use crate::failure::Failure;
use crate::model::{ImportCounts, ImportReport, ItemRecord};
use crate::util::{now_utc_string, sha256_hex, write_json_pretty};

mod field_map;
mod upsert;

use field_map::FieldMap;
use upsert::upsert_items;

const REPORT_VERSION: u32 = 1;

#[derive(Debug)]
pub(crate) struct ItemSource {
    pub records: Vec<ItemRecord>,
    pub sha256: String,
}

pub fn run(args: ImportItemsArgs) -> Result<()> {
    let source = load_source(&args.source_path)?;
    info!(
        path = %args.source_path.display(),
        sha256 = %source.sha256,
        records = source.records.len(),
        "loaded item source"
    );

    let counts = import_records(&args.db_path, &source.records).context(Failure::Import)?;
    info!(
        db = %args.db_path.display(),
        processed = counts.records_processed,
        inserted = counts.inserted,
        updated = counts.updated,
        "item import committed"
    );
    println!(
        "imported {} records ({} inserted, {} updated)",
        counts.records_processed, counts.inserted, counts.updated
    );

    if let Some(report_path) = &args.report_path {
        let report = ImportReport {
            report_version: REPORT_VERSION,
            generated_at: now_utc_string(),
            db_path: args.db_path.display().to_string(),
            source_path: args.source_path.display().to_string(),
            source_sha256: source.sha256,
            counts,
        };
        write_json_pretty(report_path, &report)
            .context("items were committed but the import report could not be written")?;
        info!(path = %report_path.display(), "wrote import report");
    }

    Ok(())
}

/// Reads and parses the source array. Runs before any database is touched.
pub(crate) fn load_source(path: &Path) -> Result<ItemSource> {
    if !path.exists() {
        return Err(anyhow!("no such file: {}", path.display()).context(Failure::SourceMissing));
    }

    let raw = fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .context(Failure::SourceInvalid)?;
    let records: Vec<ItemRecord> = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not a JSON array of objects", path.display()))
        .context(Failure::SourceInvalid)?;

    Ok(ItemSource {
        records,
        sha256: sha256_hex(&raw),
    })
}

/// Opens an existing database and upserts `records` into StdItems.
pub(crate) fn import_records(db_path: &Path, records: &[ItemRecord]) -> Result<ImportCounts> {
    // No SQLITE_OPEN_CREATE: a mistyped path must not leave an empty database behind.
    let mut connection = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open {}", db_path.display()))?;

    let counts = upsert_items(&mut connection, &FieldMap::std_items(), records)?;

    connection
        .close()
        .map_err(|(_, err)| err)
        .with_context(|| format!("failed to close {}", db_path.display()))?;

    Ok(counts)
}
