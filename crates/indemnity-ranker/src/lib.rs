//! Indemnity Ranker
//!
//! Merges heterogeneous country-level datasets onto one record per
//! country, then ranks countries by indemnity ratios.
//!
//! # Pipeline
//!
//! ```text
//! data_vie.json ──► RecordStore (canonical identities, document order)
//!                        │
//! data_pib.csv ──────────┤  per row: translate → normalize → first match > 0.95
//! data_criminality.csv ──┤          → write target fields / report unmatched
//! median-income_data.csv ┘
//!                        │
//!                        ▼
//!                  ratios → top-N report
//! ```
//!
//! # Sources
//!
//! | File | Delimiter | Name column | Fields merged |
//! |------|-----------|-------------|---------------|
//! | `data_pib.csv` | `,` | `Country Name` | `Last PIB` (latest non-empty year 2022 → 1960) |
//! | `data_criminality.csv` | `;` | `Pays` | `Indice de Criminalité`, `Indice de Sécurité` |
//! | `median-income_data.csv` | `,` | `country` | `medianIncome`, `meanIncome`, `gdpPerCapitaPPP` |

use thiserror::Error;

pub mod countries;
pub mod engine;
pub mod loader;
pub mod matcher;
pub mod normalize;
pub mod ratios;
pub mod report;
pub mod store;

pub use countries::{CountryDatabase, CountryEntry};
pub use engine::{merge_all, merge_source, MergeOutcome, Reconciler, UnmatchedRow};
pub use loader::{SourceRow, SourceSpec, TargetFields};
pub use matcher::{is_match, similarity_ratio, Matcher};
pub use normalize::normalize_name;
pub use ratios::{compute_ratios, RankedRatio, RatioKind};
pub use store::{CountryRecord, NormalizedIndex, RecordStore};

/// Similarity a candidate must strictly exceed to match a canonical key
pub const SIMILARITY_THRESHOLD: f64 = 0.95;

/// Rows per report section
pub const DEFAULT_TOP_N: usize = 10;

pub const INDEMNITY_FIELD: &str = "INDEMNITE TOTALE";
pub const GDP_FIELD: &str = "Last PIB";
pub const CRIMINALITY_FIELD: &str = "Indice de Criminalité";
pub const SECURITY_FIELD: &str = "Indice de Sécurité";
pub const MEDIAN_INCOME_FIELD: &str = "medianIncome";
pub const MEAN_INCOME_FIELD: &str = "meanIncome";
pub const PPP_FIELD: &str = "gdpPerCapitaPPP";

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid primary dataset: {0}")]
    InvalidPrimary(String),
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },
    #[error("Cannot parse {field} = {value:?} for {country}")]
    NumberParse {
        country: String,
        field: String,
        value: String,
    },
    #[error("Zero denominator in {kind} ratio for {country}")]
    ZeroDenominator { country: String, kind: String },
    #[error("Invalid country table: {0}")]
    CountryTable(String),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_france_end_to_end() {
        let dir = TempDir::new().unwrap();
        let primary = write_file(&dir, "data_vie.json", r#"{"France": {"INDEMNITE TOTALE": "1000"}}"#);
        let gdp = write_file(
            &dir,
            "data_pib.csv",
            "\u{feff}\"Country Name\",\"Country Code\",\"2021\",\"2022\"\n\"France\",\"FRA\",\"\",\"30000\"\n",
        );

        let mut store = RecordStore::from_primary_json(&primary).unwrap();
        let spec = SourceSpec {
            targets: TargetFields::LatestYear {
                field: GDP_FIELD.to_string(),
                years: 2021..=2022,
            },
            ..SourceSpec::gdp(&gdp)
        };

        let mut seen = 0;
        let outcomes = merge_all(&mut store, &[spec], &Reconciler::default(), |_| seen += 1).unwrap();
        assert_eq!(seen, 1);
        assert_eq!(outcomes[0].matched, 1);

        let record = store.get("France").unwrap();
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields[INDEMNITY_FIELD], "1000");
        assert_eq!(record.fields[GDP_FIELD], "30000");

        let ratios = compute_ratios(&store, RatioKind::IndemnityByGdp).unwrap();
        assert_eq!(format!("{:.2}", ratios[0].ratio), "0.40");
    }

    #[test]
    fn test_three_sources_merge_sequentially() {
        let dir = TempDir::new().unwrap();
        let primary = write_file(
            &dir,
            "data_vie.json",
            r#"{"Côte d'Ivoire": {"INDEMNITE TOTALE": "2 400,00 €"}, "Allemagne": {"INDEMNITE TOTALE": "3 000,00 €"}}"#,
        );
        let crime = write_file(
            &dir,
            "data_criminality.csv",
            "Pays;Indice de Criminalité;Indice de Sécurité\nCote d Ivoire;60,0;40,0\nAllemagne;35,0;65,0\nAtlantide;1;99\n",
        );
        let income = write_file(
            &dir,
            "median-income_data.csv",
            "country,medianIncome,meanIncome,gdpPerCapitaPPP\nGermany,2500,3100,61000\n",
        );

        let mut store = RecordStore::from_primary_json(&primary).unwrap();
        let sources = [SourceSpec::criminality(&crime), SourceSpec::median_income(&income)];

        let mut diagnostics = Vec::new();
        merge_all(&mut store, &sources, &Reconciler::default(), |outcome| {
            diagnostics.extend(outcome.diagnostics());
        })
        .unwrap();

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].starts_with("Le pays ATLANTIDE n'est pas dans le fichier "));
        assert!(diagnostics[0].ends_with("data_criminality.csv"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.field("Côte d'Ivoire", CRIMINALITY_FIELD), Some("60,0"));
        assert_eq!(store.field("Allemagne", SECURITY_FIELD), Some("65,0"));
        assert_eq!(store.field("Allemagne", MEDIAN_INCOME_FIELD), Some("2500"));

        let by_crime = compute_ratios(&store, RatioKind::IndemnityByCriminality).unwrap();
        let order: Vec<&str> = by_crime.iter().map(|r| r.country.as_str()).collect();
        // 3000 / 3500 > 2400 / 6000
        assert_eq!(order, vec!["Allemagne", "Côte d'Ivoire"]);
    }

    #[test]
    fn test_malformed_source_aborts() {
        let dir = TempDir::new().unwrap();
        let primary = write_file(&dir, "data_vie.json", r#"{"France": {}}"#);
        let crime = write_file(&dir, "data_criminality.csv", "Pays;Indice de Criminalité\nFrance;40\n");

        let mut store = RecordStore::from_primary_json(&primary).unwrap();
        let err = merge_all(
            &mut store,
            &[SourceSpec::criminality(&crime)],
            &Reconciler::default(),
            |_| {},
        )
        .unwrap_err();

        assert!(matches!(err, ReconcileError::MissingColumn { ref column, .. } if column == SECURITY_FIELD));
    }
}
