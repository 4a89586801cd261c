use std::collections::HashMap;

use serde_json::Value;

use crate::model::ItemRecord;

/// StdItems columns the importer writes, in bind order. Columns not listed keep
/// their current value on update and are NULL on insert.
pub const IMPORT_COLUMNS: [&str; 37] = [
    "Name",
    "Stdmode",
    "Shape",
    "Weight",
    "Anicount",
    "Source",
    "Reserved",
    "Looks",
    "DuraMax",
    "Ac",
    "Ac2",
    "Mac",
    "Mac2",
    "Dc",
    "Dc2",
    "Mc",
    "Mc2",
    "Sc",
    "Sc2",
    "Need",
    "NeedLevel",
    "Price",
    "Stock",
    "Color",
    "OverLap",
    "HP",
    "MP",
    "Light",
    "Horse",
    "Element",
    "Expand1",
    "Expand2",
    "Expand3",
    "Expand4",
    "Expand5",
    "InsuranceCurrency",
    "InsuranceGold",
];

pub const NAME_POSITION: usize = 0;
pub const STDMODE_POSITION: usize = 1;

/// Source keys tried verbatim, in order, before the case-insensitive fallback.
const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    ("Name", &["name"]),
    ("Stdmode", &["stdmode"]),
    ("Looks", &["looks"]),
    ("DuraMax", &["duraMax", "duramax"]),
    ("HP", &["hp"]),
    ("MP", &["mp"]),
];

#[derive(Debug)]
struct ColumnSource {
    column: &'static str,
    folded: String,
    aliases: &'static [&'static str],
}

/// Maps loosely-keyed records onto [`IMPORT_COLUMNS`].
#[derive(Debug)]
pub struct FieldMap {
    sources: Vec<ColumnSource>,
}

impl FieldMap {
    pub fn std_items() -> Self {
        let sources = IMPORT_COLUMNS
            .iter()
            .map(|&column| ColumnSource {
                column,
                folded: column.to_lowercase(),
                aliases: COLUMN_ALIASES
                    .iter()
                    .find(|(aliased, _)| *aliased == column)
                    .map(|(_, keys)| *keys)
                    .unwrap_or(&[]),
            })
            .collect();

        Self { sources }
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sources.iter().map(|source| source.column)
    }

    /// Resolves every mapped column for `record`, `None` meaning no source key.
    ///
    /// An alias holding JSON null falls through to the next candidate. When
    /// several keys fold to the same lowercase form the first one in document
    /// order wins.
    pub fn resolve<'a>(&self, record: &'a ItemRecord) -> Vec<Option<&'a Value>> {
        let mut folded_keys: HashMap<String, &'a Value> = HashMap::with_capacity(record.len());
        for (key, value) in record {
            folded_keys.entry(key.to_lowercase()).or_insert(value);
        }

        self.sources
            .iter()
            .map(|source| {
                source
                    .aliases
                    .iter()
                    .filter_map(|alias| record.get(*alias))
                    .find(|value| !value.is_null())
                    .or_else(|| folded_keys.get(&source.folded).copied())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{FieldMap, IMPORT_COLUMNS, NAME_POSITION, STDMODE_POSITION};
    use crate::model::ItemRecord;
    use crate::schema::STD_ITEMS;

    fn record(value: Value) -> ItemRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn resolved(map: &FieldMap, record: &ItemRecord, column: &str) -> Option<Value> {
        let position = map
            .columns()
            .position(|candidate| candidate == column)
            .expect("column should be mapped");
        map.resolve(record)[position].cloned()
    }

    #[test]
    fn import_columns_are_a_prefix_of_std_items_layout() {
        let layout = STD_ITEMS.column_names();
        assert_eq!(&layout[1..=IMPORT_COLUMNS.len()], &IMPORT_COLUMNS[..]);
        assert_eq!(IMPORT_COLUMNS[NAME_POSITION], "Name");
        assert_eq!(IMPORT_COLUMNS[STDMODE_POSITION], "Stdmode");
    }

    #[test]
    fn lookup_ignores_key_case() {
        let map = FieldMap::std_items();
        let item = record(json!({ "NAME": "Sword", "STDMODE": 5, "price": 10, "needlevel": 7 }));

        assert_eq!(resolved(&map, &item, "Name"), Some(json!("Sword")));
        assert_eq!(resolved(&map, &item, "Stdmode"), Some(json!(5)));
        assert_eq!(resolved(&map, &item, "Price"), Some(json!(10)));
        assert_eq!(resolved(&map, &item, "NeedLevel"), Some(json!(7)));
    }

    #[test]
    fn missing_keys_resolve_to_none_not_zero() {
        let map = FieldMap::std_items();
        let item = record(json!({ "name": "Potion" }));

        let row = map.resolve(&item);
        assert_eq!(row.len(), IMPORT_COLUMNS.len());
        assert_eq!(row.iter().filter(|value| value.is_some()).count(), 1);
        assert_eq!(resolved(&map, &item, "Price"), None);
    }

    #[test]
    fn dura_max_prefers_camel_case_alias() {
        let map = FieldMap::std_items();
        let item = record(json!({ "duramax": 10, "duraMax": 20 }));
        assert_eq!(resolved(&map, &item, "DuraMax"), Some(json!(20)));
    }

    #[test]
    fn null_alias_falls_through_to_next_variant() {
        let map = FieldMap::std_items();
        let item = record(json!({ "duraMax": null, "duramax": 15 }));
        assert_eq!(resolved(&map, &item, "DuraMax"), Some(json!(15)));
    }

    #[test]
    fn first_key_in_document_order_wins_among_case_variants() {
        let map = FieldMap::std_items();
        let item = record(json!({ "WEIGHT": 3, "weight": 4, "Weight": 5 }));
        assert_eq!(resolved(&map, &item, "Weight"), Some(json!(3)));
    }

    #[test]
    fn values_pass_through_without_coercion() {
        let map = FieldMap::std_items();
        let item = record(json!({ "price": "100", "bind": true, "color": null, "shine": 1 }));

        assert_eq!(resolved(&map, &item, "Price"), Some(json!("100")));
        assert_eq!(resolved(&map, &item, "Color"), Some(Value::Null));
    }
}
