use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::schema::{GAME_TABLES, table_exists};

pub fn run(args: StatusArgs) -> Result<()> {
    let connection = Connection::open_with_flags(
        &args.db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open {}", args.db_path.display()))?;

    info!(path = %args.db_path.display(), "status requested");

    for (table, rows) in table_counts(&connection)? {
        match rows {
            Some(rows) => {
                info!(table, rows, "table status");
                println!("{table}: {rows} rows");
            }
            None => {
                warn!(table, "table missing");
                println!("{table}: missing");
            }
        }
    }

    Ok(())
}

/// Row count per game table, `None` when the table does not exist.
pub(crate) fn table_counts(connection: &Connection) -> Result<Vec<(&'static str, Option<i64>)>> {
    let mut counts = Vec::with_capacity(GAME_TABLES.len());

    for table in GAME_TABLES {
        if !table_exists(connection, table.name)? {
            counts.push((table.name, None));
            continue;
        }

        let rows = connection
            .query_row(&format!("SELECT COUNT(*) FROM {}", table.name), [], |row| {
                row.get(0)
            })
            .with_context(|| format!("failed to count rows in {}", table.name))?;
        counts.push((table.name, Some(rows)));
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::table_counts;
    use crate::schema::{GAME_TABLES, STD_ITEMS, create_tables};

    #[test]
    fn counts_rows_and_flags_missing_tables() {
        let mut connection = Connection::open_in_memory().expect("in-memory DB should open");
        create_tables(&mut connection, &[STD_ITEMS]).expect("schema should apply");
        connection
            .execute("INSERT INTO StdItems (Name, Stdmode) VALUES ('Potion', 0)", [])
            .expect("row should insert");

        let counts = table_counts(&connection).expect("counts should load");
        assert_eq!(
            counts,
            vec![("Magic", None), ("StdItems", Some(1)), ("Monster", None)]
        );
    }

    #[test]
    fn fresh_schema_reports_empty_tables() {
        let mut connection = Connection::open_in_memory().expect("in-memory DB should open");
        create_tables(&mut connection, &GAME_TABLES).expect("schema should apply");

        let counts = table_counts(&connection).expect("counts should load");
        assert!(counts.iter().all(|(_, rows)| *rows == Some(0)));
    }
}
