//! Reconciliation of secondary sources onto canonical records
//!
//! Each source row goes through translate → normalize → scan. The scan
//! walks the normalized index in insertion order and stops at the first
//! key that clears the similarity threshold; it does not look for the best
//! one. Rows that clear no key are reported back and dropped.

use crate::countries::CountryDatabase;
use crate::loader::{read_source_rows, SourceRow, SourceSpec, TargetFields};
use crate::matcher::Matcher;
use crate::normalize::normalize_name;
use crate::store::{NormalizedIndex, RecordStore};
use crate::Result;
use tracing::{debug, info};

/// Translator and matcher shared by every merge pass
#[derive(Debug, Clone)]
pub struct Reconciler {
    pub countries: CountryDatabase,
    pub matcher: Matcher,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            countries: CountryDatabase::with_defaults(),
            matcher: Matcher::default(),
        }
    }
}

impl Reconciler {
    pub fn new(countries: CountryDatabase, matcher: Matcher) -> Self {
        Self { countries, matcher }
    }

    /// Comparison key for a raw source name
    pub fn candidate_key(&self, raw_name: &str) -> String {
        normalize_name(self.countries.translate_or_identity(raw_name))
    }

    /// First identity in `index` whose key matches `candidate`, with its
    /// similarity ratio
    pub fn resolve<'a>(
        &self,
        candidate: &str,
        index: &'a NormalizedIndex,
    ) -> Option<(&'a str, f64)> {
        index
            .iter()
            .find_map(|(key, identity)| Some((identity, self.matcher.score(candidate, key)?)))
    }
}

/// A source row whose country resolved to no canonical identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedRow {
    /// Name as written in the source
    pub raw_name: String,
    /// Translated and normalized key that failed to match
    pub candidate: String,
}

/// Result of merging one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub source: String,
    pub matched: usize,
    pub fields_written: usize,
    pub unmatched: Vec<UnmatchedRow>,
}

impl MergeOutcome {
    /// `Le pays <name> n'est pas dans le fichier <file>` for every unmatched row
    pub fn diagnostics(&self) -> impl Iterator<Item = String> + '_ {
        self.unmatched.iter().map(move |row| {
            format!(
                "Le pays {} n'est pas dans le fichier {}",
                row.candidate, self.source
            )
        })
    }
}

/// Merge `rows` of one source into `store`.
///
/// A row lacking the name column or any target column is fatal for the
/// whole run. An unmatched country is not.
pub fn merge_source(
    store: &mut RecordStore,
    index: &NormalizedIndex,
    rows: &[SourceRow],
    spec: &SourceSpec,
    reconciler: &Reconciler,
) -> Result<MergeOutcome> {
    let source = spec.display_name();
    let mut outcome = MergeOutcome {
        source: source.clone(),
        ..Default::default()
    };

    for row in rows {
        let raw_name = row.require(&spec.name_field, &source)?;
        let candidate = reconciler.candidate_key(raw_name);

        let Some((identity, ratio)) = reconciler.resolve(&candidate, index) else {
            debug!("No match for {:?} ({:?})", raw_name, candidate);
            outcome.unmatched.push(UnmatchedRow {
                raw_name: raw_name.to_string(),
                candidate,
            });
            continue;
        };

        debug!("Matched {:?} -> {} (ratio {:.3})", raw_name, identity, ratio);
        outcome.matched += 1;
        outcome.fields_written += write_targets(store, identity, row, &spec.targets, &source)?;
    }

    info!(
        "Merged {}: {} matched, {} unmatched, {} fields written",
        source,
        outcome.matched,
        outcome.unmatched.len(),
        outcome.fields_written
    );

    Ok(outcome)
}

/// Read a source file and merge it in one step
pub fn merge_file(
    store: &mut RecordStore,
    index: &NormalizedIndex,
    spec: &SourceSpec,
    reconciler: &Reconciler,
) -> Result<MergeOutcome> {
    let rows = read_source_rows(&spec.path, spec.delimiter)?;
    merge_source(store, index, &rows, spec, reconciler)
}

/// Merge every source in order, each fully before the next is read.
///
/// The normalized index is built once from the primary identities.
/// `on_merged` runs after each source, so diagnostics can be emitted
/// before the next file is opened.
pub fn merge_all<F>(
    store: &mut RecordStore,
    sources: &[SourceSpec],
    reconciler: &Reconciler,
    mut on_merged: F,
) -> Result<Vec<MergeOutcome>>
where
    F: FnMut(&MergeOutcome),
{
    let index = store.normalized_index();
    let mut outcomes = Vec::with_capacity(sources.len());

    for spec in sources {
        let outcome = merge_file(store, &index, spec, reconciler)?;
        on_merged(&outcome);
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

fn write_targets(
    store: &mut RecordStore,
    identity: &str,
    row: &SourceRow,
    targets: &TargetFields,
    source: &str,
) -> Result<usize> {
    match targets {
        TargetFields::Named(fields) => {
            for field in fields {
                let value = row.require(field, source)?;
                store.set_field(identity, field, value);
            }
            Ok(fields.len())
        }
        TargetFields::LatestYear { field, years } => {
            for year in years.clone().rev() {
                let value = row.require(&year.to_string(), source)?;
                if !value.is_empty() {
                    store.set_field(identity, field, value);
                    return Ok(1);
                }
            }
            Ok(0)
        }
    }
}
