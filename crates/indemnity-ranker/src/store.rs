//! Canonical per-country records
//!
//! Identities come from the primary dataset only and keep its document
//! order. Secondary sources enrich existing records; they never add or
//! remove identities, and fields are only ever added or overwritten.

use crate::normalize::normalize_name;
use crate::{ReconcileError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Field name → raw string value (not yet numeric)
pub type Fields = BTreeMap<String, String>;

/// A canonical identity and its merged fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRecord {
    pub name: String,
    pub fields: Fields,
}

/// Insertion-ordered identity → fields map
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<CountryRecord>,
    positions: HashMap<String, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from the primary JSON file
    pub fn from_primary_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading primary dataset from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let root: Value = serde_json::from_reader(reader)?;
        let store = Self::from_json_value(root)?;

        info!("Loaded {} countries", store.len());
        Ok(store)
    }

    /// Seed the store from a JSON object literal
    pub fn from_json_str(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;
        Self::from_json_value(root)
    }

    fn from_json_value(root: Value) -> Result<Self> {
        let Value::Object(countries) = root else {
            return Err(ReconcileError::InvalidPrimary(
                "top level must be an object keyed by country name".to_string(),
            ));
        };

        let mut store = Self::new();
        for (name, value) in countries {
            let Value::Object(raw_fields) = value else {
                return Err(ReconcileError::InvalidPrimary(format!(
                    "entry '{name}' must be an object of fields"
                )));
            };

            let mut fields = Fields::new();
            for (field, value) in raw_fields {
                let text = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    other => {
                        return Err(ReconcileError::InvalidPrimary(format!(
                            "entry '{name}', field '{field}': expected string or number, got {other}"
                        )))
                    }
                };
                fields.insert(field, text);
            }
            store.insert(name, fields);
        }

        Ok(store)
    }

    /// Add an identity. Re-inserting an existing identity keeps its
    /// position and merges the new fields over the old ones.
    pub fn insert(&mut self, name: impl Into<String>, fields: Fields) {
        let name = name.into();
        match self.positions.get(&name) {
            Some(&i) => self.records[i].fields.extend(fields),
            None => {
                self.positions.insert(name.clone(), self.records.len());
                self.records.push(CountryRecord { name, fields });
            }
        }
    }

    /// Write `field` on an existing identity. Returns `false` (and writes
    /// nothing) when the identity is unknown.
    pub fn set_field(&mut self, name: &str, field: &str, value: impl Into<String>) -> bool {
        match self.positions.get(name) {
            Some(&i) => {
                let value = value.into();
                debug!("{} <- {} = {:?}", name, field, value);
                self.records[i].fields.insert(field.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&CountryRecord> {
        self.positions.get(name).map(|&i| &self.records[i])
    }

    pub fn field(&self, name: &str, field: &str) -> Option<&str> {
        self.get(name)
            .and_then(|record| record.fields.get(field))
            .map(String::as_str)
    }

    /// Records in primary-source order
    pub fn iter(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build the normalized index over current identities
    pub fn normalized_index(&self) -> NormalizedIndex {
        NormalizedIndex::build(self.records.iter().map(|r| r.name.as_str()))
    }

    /// JSON object in primary-source order, for `--dump-merged`
    pub fn to_json(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .records
            .iter()
            .map(|r| {
                let fields: serde_json::Map<String, Value> = r
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                (r.name.clone(), Value::Object(fields))
            })
            .collect();
        Value::Object(map)
    }
}

/// Normalized key → identity, scanned in insertion order.
///
/// When two identities normalize to the same key only the first is kept,
/// so a scan can never reach the later one anyway.
#[derive(Debug, Clone, Default)]
pub struct NormalizedIndex {
    entries: Vec<(String, String)>,
}

impl NormalizedIndex {
    pub fn build<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        for name in names {
            let key = normalize_name(name);
            if entries.iter().any(|(existing, _)| *existing == key) {
                debug!("'{}' shares key {:?} with an earlier country", name, key);
                continue;
            }
            entries.push((key, name.to_string()));
        }
        Self { entries }
    }

    /// `(normalized key, identity)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_primary_order_preserved() {
        let store = RecordStore::from_json_str(
            r#"{"Suisse": {"INDEMNITE TOTALE": "3 500,00 €"}, "Allemagne": {}, "Autriche": {}}"#,
        )
        .unwrap();

        let names: Vec<&str> = store.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Suisse", "Allemagne", "Autriche"]);
        assert_eq!(store.field("Suisse", "INDEMNITE TOTALE"), Some("3 500,00 €"));
    }

    #[test]
    fn test_numbers_kept_as_text() {
        let store = RecordStore::from_json_str(r#"{"France": {"INDEMNITE TOTALE": 1000}}"#).unwrap();
        assert_eq!(store.field("France", "INDEMNITE TOTALE"), Some("1000"));
    }

    #[test]
    fn test_invalid_primary_shapes() {
        assert!(matches!(
            RecordStore::from_json_str(r#"["France"]"#),
            Err(ReconcileError::InvalidPrimary(_))
        ));
        assert!(matches!(
            RecordStore::from_json_str(r#"{"France": "1000"}"#),
            Err(ReconcileError::InvalidPrimary(_))
        ));
        assert!(matches!(
            RecordStore::from_json_str(r#"{"France": {"INDEMNITE TOTALE": null}}"#),
            Err(ReconcileError::InvalidPrimary(_))
        ));
        assert!(matches!(
            RecordStore::from_json_str("{not json"),
            Err(ReconcileError::Json(_))
        ));
    }

    #[test]
    fn test_set_field_never_creates_identity() {
        let mut store = RecordStore::from_json_str(r#"{"France": {}}"#).unwrap();

        assert!(store.set_field("France", "Last PIB", "30000"));
        assert!(store.set_field("France", "Last PIB", "31000"));
        assert!(!store.set_field("Narnia", "Last PIB", "1"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.field("France", "Last PIB"), Some("31000"));
        assert!(store.get("Narnia").is_none());
    }

    #[test]
    fn test_normalized_index_first_key_wins() {
        let index = NormalizedIndex::build(["Côte d'Ivoire", "Cote d'Ivoire", "Pérou"]);
        let entries: Vec<(&str, &str)> = index.iter().collect();
        assert_eq!(
            entries,
            vec![("COTE DIVOIRE", "Côte d'Ivoire"), ("PEROU", "Pérou")]
        );
    }

    #[test]
    fn test_from_primary_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(r#"{"Japon": {"INDEMNITE TOTALE": "4200"}}"#.as_bytes())
            .unwrap();

        let store = RecordStore::from_primary_json(file.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.normalized_index().len(), 1);
    }

    #[test]
    fn test_to_json_round_trips_fields() {
        let mut store = RecordStore::from_json_str(r#"{"B": {"x": "1"}, "A": {}}"#).unwrap();
        store.set_field("A", "y", "2");

        let json = store.to_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(json["A"]["y"], "2");
    }
}
