use serde::Serialize;
use serde_json::{Map, Value};

/// One loosely-typed item object from the source JSON array.
pub type ItemRecord = Map<String, Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub records_processed: usize,
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub report_version: u32,
    pub generated_at: String,
    pub db_path: String,
    pub source_path: String,
    pub source_sha256: String,
    #[serde(flatten)]
    pub counts: ImportCounts,
}
