use anyhow::{Context, Result, bail};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use serde_json::Value;
use tracing::debug;

use super::field_map::{FieldMap, NAME_POSITION, STDMODE_POSITION};
use crate::model::{ImportCounts, ItemRecord};
use crate::schema::STD_ITEMS;

fn update_sql(field_map: &FieldMap) -> String {
    let assignments: Vec<String> = field_map
        .columns()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect();
    let key_index = assignments.len();

    format!(
        "UPDATE {} SET {} WHERE Name = ?{} AND Stdmode = ?{}",
        STD_ITEMS.name,
        assignments.join(", "),
        key_index + 1,
        key_index + 2
    )
}

fn insert_sql(field_map: &FieldMap) -> String {
    let columns: Vec<&str> = field_map.columns().collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|index| format!("?{index}")).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        STD_ITEMS.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Binds a JSON value as-is. SQLite has no boolean type, so booleans become 0/1.
fn to_sql_value(column: &str, value: Option<&Value>) -> Result<SqlValue> {
    let converted = match value {
        None | Some(Value::Null) => SqlValue::Null,
        Some(Value::Bool(flag)) => SqlValue::Integer(i64::from(*flag)),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => match number.as_f64() {
                Some(real) => SqlValue::Real(real),
                None => bail!("column {column}: number {number} cannot be stored"),
            },
        },
        Some(Value::String(text)) => SqlValue::Text(text.clone()),
        Some(other @ (Value::Array(_) | Value::Object(_))) => {
            bail!("column {column}: nested value {other} cannot be stored")
        }
    };
    Ok(converted)
}

/// Upserts every record into StdItems inside a single transaction.
///
/// Each record first updates all rows matching its (Name, Stdmode); when none
/// match it is inserted. Any failure rolls back the whole batch.
pub fn upsert_items(
    connection: &mut Connection,
    field_map: &FieldMap,
    records: &[ItemRecord],
) -> Result<ImportCounts> {
    let tx = connection
        .transaction()
        .context("failed to begin import transaction")?;

    let mut counts = ImportCounts::default();
    {
        let mut update = tx
            .prepare(&update_sql(field_map))
            .context("failed to prepare StdItems update")?;
        let mut insert = tx
            .prepare(&insert_sql(field_map))
            .context("failed to prepare StdItems insert")?;

        for (index, record) in records.iter().enumerate() {
            let values = field_map
                .resolve(record)
                .into_iter()
                .zip(field_map.columns())
                .map(|(value, column)| to_sql_value(column, value))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("record {index} has an unsupported value"))?;

            let name = &values[NAME_POSITION];
            let stdmode = &values[STDMODE_POSITION];

            let changed = update
                .execute(params_from_iter(values.iter().chain([name, stdmode])))
                .with_context(|| format!("failed to update record {index}"))?;

            if changed == 0 {
                insert
                    .execute(params_from_iter(values.iter()))
                    .with_context(|| format!("failed to insert record {index}"))?;
                counts.inserted += 1;
                debug!(index, name = ?name, stdmode = ?stdmode, "inserted item");
            } else {
                counts.updated += 1;
                debug!(index, name = ?name, stdmode = ?stdmode, rows = changed, "updated item");
            }
            counts.records_processed += 1;
        }
    }

    tx.commit().context("failed to commit import transaction")?;
    Ok(counts)
}
