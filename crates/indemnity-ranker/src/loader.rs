//! Secondary source loading from CSV files

use crate::{
    ReconcileError, Result, CRIMINALITY_FIELD, GDP_FIELD, MEAN_INCOME_FIELD, MEDIAN_INCOME_FIELD,
    PPP_FIELD, SECURITY_FIELD,
};
use std::collections::HashMap;
use std::fs::File;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::info;

/// First and last year columns of the World Bank GDP export
pub const GDP_YEARS: RangeInclusive<u16> = 1960..=2022;

/// Which fields a source contributes to matched records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetFields {
    /// Copy each named column verbatim under the same field name
    Named(Vec<String>),
    /// Write the most recent non-empty year column into `field`
    LatestYear {
        field: String,
        years: RangeInclusive<u16>,
    },
}

impl TargetFields {
    pub fn named<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(fields.into_iter().map(Into::into).collect())
    }
}

/// How to read one secondary source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub name_field: String,
    pub targets: TargetFields,
    pub delimiter: u8,
}

impl SourceSpec {
    /// World Bank GDP history (comma-delimited, one column per year)
    pub fn gdp(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name_field: "Country Name".to_string(),
            targets: TargetFields::LatestYear {
                field: GDP_FIELD.to_string(),
                years: GDP_YEARS,
            },
            delimiter: b',',
        }
    }

    /// Crime/security indices (semicolon-delimited)
    pub fn criminality(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name_field: "Pays".to_string(),
            targets: TargetFields::named([CRIMINALITY_FIELD, SECURITY_FIELD]),
            delimiter: b';',
        }
    }

    /// Median/mean income and GDP per capita PPP (comma-delimited)
    pub fn median_income(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name_field: "country".to_string(),
            targets: TargetFields::named([MEDIAN_INCOME_FIELD, MEAN_INCOME_FIELD, PPP_FIELD]),
            delimiter: b',',
        }
    }

    /// File name used in diagnostics
    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

/// One data row of a secondary source, keyed by cleaned header name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    values: HashMap<String, String>,
}

impl SourceRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Value of `column`, or a fatal `MissingColumn` naming `file`
    pub fn require(&self, column: &str, file: &str) -> Result<&str> {
        self.get(column).ok_or_else(|| ReconcileError::MissingColumn {
            file: file.to_string(),
            column: column.to_string(),
        })
    }
}

/// Strip a UTF-8 BOM and stray surrounding quotes from a header name
fn clean_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim_matches('"')
        .to_string()
}

/// Read every row of a source into memory. The file handle is released
/// before this returns, whether reading succeeded or not.
pub fn read_source_rows(path: impl AsRef<Path>, delimiter: u8) -> Result<Vec<SourceRow>> {
    let path = path.as_ref();
    info!("Loading source rows from {:?}", path);

    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // Short rows simply lack the trailing columns; lookups report them
        let values = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(SourceRow { values });
    }

    info!("Read {} rows ({} columns)", rows.len(), headers.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_bom_quoted_header_is_cleaned() {
        let file = write_temp("\u{feff}\"Country Name\",\"2021\",\"2022\"\n\"France\",\"\",\"30000\"\n");

        let rows = read_source_rows(file.path(), b',').unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Country Name"), Some("France"));
        assert_eq!(rows[0].get("2021"), Some(""));
        assert_eq!(rows[0].get("2022"), Some("30000"));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let file = write_temp("Pays;Indice de Criminalité;Indice de Sécurité\nJapon;22,4;77,6\n");

        let rows = read_source_rows(file.path(), b';').unwrap();
        assert_eq!(rows[0].get("Pays"), Some("Japon"));
        assert_eq!(rows[0].get("Indice de Criminalité"), Some("22,4"));
        assert_eq!(rows[0].get("Indice de Sécurité"), Some("77,6"));
    }

    #[test]
    fn test_short_row_lacks_trailing_columns() {
        let file = write_temp("country,medianIncome,meanIncome\nPeru,4000\n");

        let rows = read_source_rows(file.path(), b',').unwrap();
        assert_eq!(rows[0].get("medianIncome"), Some("4000"));
        assert_eq!(rows[0].get("meanIncome"), None);

        let err = rows[0].require("meanIncome", "income.csv").unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::MissingColumn { ref file, ref column }
                if file == "income.csv" && column == "meanIncome"
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_source_rows("/nonexistent/data_pib.csv", b',').unwrap_err();
        assert!(matches!(err, ReconcileError::Io(_)));
    }

    #[test]
    fn test_presets() {
        let gdp = SourceSpec::gdp("data/data_pib.csv");
        assert_eq!(gdp.name_field, "Country Name");
        assert_eq!(
            gdp.targets,
            TargetFields::LatestYear {
                field: "Last PIB".to_string(),
                years: 1960..=2022
            }
        );

        let crime = SourceSpec::criminality("data/data_criminality.csv");
        assert_eq!(crime.delimiter, b';');
        assert_eq!(
            crime.targets,
            TargetFields::named(["Indice de Criminalité", "Indice de Sécurité"])
        );

        let income = SourceSpec::median_income("data/median-income_data.csv");
        assert_eq!(income.name_field, "country");
        assert_eq!(income.display_name(), "data/median-income_data.csv");
    }
}
