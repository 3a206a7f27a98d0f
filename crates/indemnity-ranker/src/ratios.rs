//! Derived indemnity ratios over merged records
//!
//! | Kind | Formula |
//! |------|---------|
//! | `IndemnityByGdp` | I / (PIB / 12) |
//! | `IndemnityByCriminality` | I / (C × 100) |
//! | `IndemnityByDangerosityAndGdp` | I / (PIB × α + C), α = 1 |
//! | `IndemnityByMedianIncome` | I / M |
//! | `WeightedCriminality` | I / (PIB × α + C × (1 − α)), α = 0.5 |
//!
//! I = `INDEMNITE TOTALE`, PIB = `Last PIB`, C = `Indice de Criminalité`,
//! M = `medianIncome`. A record missing any required field is left out of
//! that ranking. A present field that does not parse, or a denominator of
//! zero, aborts the run.

use crate::store::{CountryRecord, RecordStore};
use crate::{
    ReconcileError, Result, CRIMINALITY_FIELD, GDP_FIELD, INDEMNITY_FIELD, MEDIAN_INCOME_FIELD,
};
use tracing::debug;

/// Months per year, to turn annual GDP per capita into a monthly figure
const MONTHS_PER_YEAR: f64 = 12.0;

/// Scale applied to the crime index
const CRIMINALITY_SCALE: f64 = 100.0;

/// GDP weight of the dangerosity × GDP blend
const DANGEROSITY_ALPHA: f64 = 1.0;

/// GDP weight of the weighted criminality blend
const WEIGHTED_ALPHA: f64 = 0.5;

/// Marker some exports use for "no value"
const MISSING_MARKER: &str = "N/A";

/// The rankings the report can print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatioKind {
    IndemnityByGdp,
    IndemnityByCriminality,
    IndemnityByDangerosityAndGdp,
    IndemnityByMedianIncome,
    WeightedCriminality,
}

impl RatioKind {
    /// Sections printed by default, in report order
    pub const REPORTED: [RatioKind; 4] = [
        RatioKind::IndemnityByGdp,
        RatioKind::IndemnityByCriminality,
        RatioKind::IndemnityByDangerosityAndGdp,
        RatioKind::IndemnityByMedianIncome,
    ];

    /// Section title; `...` is replaced by N when rendered
    pub fn title(&self) -> &'static str {
        match self {
            Self::IndemnityByGdp => "Top ... des pays par indemnité/PIB par habitant:",
            Self::IndemnityByCriminality => "Top ... des pays par indemnité/Indice de Criminalité:",
            Self::IndemnityByDangerosityAndGdp => {
                "Top ... des pays par indemnités/dangerosité*PIB par habitant:"
            }
            Self::IndemnityByMedianIncome => "Top ... des pays par indemnité/Revenu Médian:",
            Self::WeightedCriminality => {
                "Top ... des pays par indemnité/criminalité*PIB par habitant:"
            }
        }
    }

    /// Ratio for one record, `None` when a required field is absent
    pub fn compute(&self, record: &CountryRecord) -> Result<Option<f64>> {
        let Some(indemnity) = numeric_field(record, INDEMNITY_FIELD)? else {
            return Ok(None);
        };

        let denominator = match self {
            Self::IndemnityByGdp => {
                numeric_field(record, GDP_FIELD)?.map(|pib| pib / MONTHS_PER_YEAR)
            }
            Self::IndemnityByCriminality => {
                numeric_field(record, CRIMINALITY_FIELD)?.map(|c| c * CRIMINALITY_SCALE)
            }
            Self::IndemnityByDangerosityAndGdp => {
                match (
                    numeric_field(record, GDP_FIELD)?,
                    numeric_field(record, CRIMINALITY_FIELD)?,
                ) {
                    (Some(pib), Some(c)) => Some(pib * DANGEROSITY_ALPHA + c),
                    _ => None,
                }
            }
            Self::IndemnityByMedianIncome => numeric_field(record, MEDIAN_INCOME_FIELD)?,
            Self::WeightedCriminality => {
                match (
                    numeric_field(record, GDP_FIELD)?,
                    numeric_field(record, CRIMINALITY_FIELD)?,
                ) {
                    (Some(pib), Some(c)) => {
                        Some(pib * WEIGHTED_ALPHA + c * (1.0 - WEIGHTED_ALPHA))
                    }
                    _ => None,
                }
            }
        };

        match denominator {
            Some(d) if d == 0.0 => Err(ReconcileError::ZeroDenominator {
                country: record.name.clone(),
                kind: format!("{:?}", self),
            }),
            d => Ok(d.map(|d| indemnity / d)),
        }
    }
}

/// One ranked country
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRatio {
    pub country: String,
    pub ratio: f64,
}

/// Parse a currency-formatted figure: `"1 234,50 €"` → `1234.5`
pub fn clean_numeric_value(value: &str) -> std::result::Result<f64, std::num::ParseFloatError> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '€' | '$') && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>()
}

/// Numeric value of `field`, `None` when absent
fn numeric_field(record: &CountryRecord, field: &str) -> Result<Option<f64>> {
    let Some(raw) = record.fields.get(field) else {
        return Ok(None);
    };
    if raw.trim() == MISSING_MARKER {
        return Ok(None);
    }

    // "inf" and "NaN" parse as f64 but are not figures
    match clean_numeric_value(raw) {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ReconcileError::NumberParse {
            country: record.name.clone(),
            field: field.to_string(),
            value: raw.clone(),
        }),
    }
}

/// Rank every record that carries the fields `kind` needs, highest first.
/// Ties keep primary-source order.
pub fn compute_ratios(store: &RecordStore, kind: RatioKind) -> Result<Vec<RankedRatio>> {
    let mut ratios = Vec::new();
    for record in store.iter() {
        if let Some(ratio) = kind.compute(record)? {
            ratios.push(RankedRatio {
                country: record.name.clone(),
                ratio,
            });
        }
    }

    ratios.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));

    debug!("{:?}: {} of {} countries ranked", kind, ratios.len(), store.len());
    Ok(ratios)
}
