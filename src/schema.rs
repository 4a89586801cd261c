//! Fixed table layouts for the game database.
//!
//! Column order is part of the on-disk contract: other tools read these tables
//! positionally, so entries here must never be reordered.

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub column_type: ColumnType,
}

const fn int(name: &'static str) -> Column {
    Column {
        name,
        column_type: ColumnType::Integer,
    }
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        column_type: ColumnType::Text,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    /// Auto-incrementing `INTEGER PRIMARY KEY`, always the first column.
    pub identity: Option<&'static str>,
    pub columns: &'static [Column],
}

impl TableSpec {
    pub fn create_sql(&self) -> String {
        let mut definitions = Vec::with_capacity(self.columns.len() + 1);
        if let Some(identity) = self.identity {
            definitions.push(format!("    {identity} INTEGER PRIMARY KEY AUTOINCREMENT"));
        }
        definitions.extend(
            self.columns
                .iter()
                .map(|column| format!("    {} {}", column.name, column.column_type.as_sql())),
        );

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.name,
            definitions.join(",\n")
        )
    }

    /// All column names in declaration order, identity first.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.identity
            .into_iter()
            .chain(self.columns.iter().map(|column| column.name))
            .collect()
    }
}

pub const MAGIC: TableSpec = TableSpec {
    name: "Magic",
    identity: Some("MagID"),
    columns: &[
        text("MagName"),
        int("EffectType"),
        int("Effect"),
        int("Spell"),
        int("Power"),
        int("MaxPower"),
        int("DefSpell"),
        int("DefPower"),
        int("DefMaxPower"),
        int("Job"),
        int("NeedL1"),
        int("L1Train"),
        int("NeedL2"),
        int("L2Train"),
        int("NeedL3"),
        int("L3Train"),
        int("Delay"),
        text("Descr"),
        int("NeedL4"),
        int("L4Train"),
        int("NeedL5"),
        int("L5Train"),
        int("NeedL6"),
        int("L6Train"),
        int("NeedL7"),
        int("L7Train"),
        int("NeedL8"),
        int("L8Train"),
        int("NeedL9"),
        int("L9Train"),
        int("NeedL10"),
        int("L10Train"),
        int("NeedL11"),
        int("L11Train"),
        int("NeedL12"),
        int("L12Train"),
        int("NeedL13"),
        int("L13Train"),
        int("NeedL14"),
        int("L14Train"),
        int("NeedL15"),
        int("L15Train"),
        int("MaxTrainLv"),
        int("CanUpgrade"),
        int("MaxUpgradeLv"),
    ],
};

pub const STD_ITEMS: TableSpec = TableSpec {
    name: "StdItems",
    identity: Some("Idx"),
    columns: &[
        text("Name"),
        int("Stdmode"),
        int("Shape"),
        int("Weight"),
        int("Anicount"),
        int("Source"),
        int("Reserved"),
        int("Looks"),
        int("DuraMax"),
        int("Ac"),
        int("Ac2"),
        int("Mac"),
        int("Mac2"),
        int("Dc"),
        int("Dc2"),
        int("Mc"),
        int("Mc2"),
        int("Sc"),
        int("Sc2"),
        int("Need"),
        int("NeedLevel"),
        int("Price"),
        int("Stock"),
        int("Color"),
        int("OverLap"),
        int("HP"),
        int("MP"),
        int("Light"),
        int("Horse"),
        int("Element"),
        int("Expand1"),
        int("Expand2"),
        int("Expand3"),
        int("Expand4"),
        int("Expand5"),
        int("InsuranceCurrency"),
        int("InsuranceGold"),
        int("Element1"),
        int("Element2"),
        int("Element3"),
        int("Element4"),
        int("Element5"),
        int("Element6"),
        int("Element7"),
        int("Element8"),
        int("Element9"),
        int("Element10"),
        int("Element11"),
        int("Element12"),
        int("Element13"),
        int("Element14"),
        int("Element15"),
        int("Element16"),
        int("Element17"),
        int("Element18"),
        int("Element19"),
        int("Element20"),
        int("UniqueItem"),
        int("ItemType"),
        int("ItemSet"),
        int("Smite"),
        int("Droprate"),
        int("Igndef"),
        int("DamAdd"),
        int("DamReb"),
        int("DcReDu"),
        int("McReDu"),
        int("ExpAdd"),
        int("Bind"),
        int("Shine"),
        int("Reference"),
    ],
};

// No identity column: rows are distinguishable by insertion order only.
pub const MONSTER: TableSpec = TableSpec {
    name: "Monster",
    identity: None,
    columns: &[
        text("Name"),
        int("Race"),
        int("RaceImg"),
        int("Appr"),
        int("Lvl"),
        int("Undead"),
        int("CoolEye"),
        int("Exp"),
        int("HP"),
        int("MP"),
        int("AC"),
        int("MAC"),
        int("DC"),
        int("DCMAX"),
        int("MC"),
        int("SC"),
        int("SPEED"),
        int("HIT"),
        int("WALK_SPD"),
        int("WalkStep"),
        int("WaLkWait"),
        int("ATTACK_SPD"),
        int("EXPLOREITEM"),
        int("INLEVEL"),
        int("IPEXP"),
    ],
};

pub const GAME_TABLES: [TableSpec; 3] = [MAGIC, STD_ITEMS, MONSTER];

/// Creates every table in `tables` inside one transaction.
///
/// On the first failing statement the transaction is rolled back explicitly and
/// the statement's error is returned; no table from this call persists.
pub fn create_tables(connection: &mut Connection, tables: &[TableSpec]) -> Result<()> {
    let tx = connection
        .transaction()
        .context("failed to begin schema transaction")?;

    for table in tables {
        let outcome = tx
            .execute_batch(&table.create_sql())
            .with_context(|| format!("failed to create table {}", table.name));

        if let Err(err) = outcome {
            if let Err(rollback_err) = tx.rollback() {
                warn!(error = %rollback_err, "schema rollback failed");
            }
            return Err(err);
        }
        debug!(table = table.name, "table ready");
    }

    tx.commit().context("failed to commit schema transaction")?;
    Ok(())
}

pub fn table_exists(connection: &Connection, table_name: &str) -> Result<bool> {
    let count: i64 = connection
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table_name],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to look up table {table_name}"))?;
    Ok(count > 0)
}
