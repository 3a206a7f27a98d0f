//! Plain-text ranking report

use crate::ratios::{compute_ratios, RankedRatio, RatioKind};
use crate::store::RecordStore;
use crate::Result;
use std::fmt::Write as _;
use std::io::Write;

/// Render one top-N section.
///
/// ```text
/// Top 3 des pays par indemnité/Revenu Médian:
/// -------------------------------------------
/// Suisse : 2.41
/// Japon : 1.87
/// Norvège : 1.52
///
/// ```
pub fn render_section(title_template: &str, ratios: &[RankedRatio], n: usize) -> String {
    let title = title_template.replace("...", &n.to_string());
    let mut out = String::new();

    // Underline counts chars, not bytes, so accented titles line up
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
    for r in ratios.iter().take(n) {
        let _ = writeln!(out, "{} : {:.2}", r.country, r.ratio);
    }
    out.push('\n');
    out
}

/// Compute and write every section in `kinds` to `writer`
pub fn write_report<W: Write>(
    writer: &mut W,
    store: &RecordStore,
    kinds: &[RatioKind],
    n: usize,
) -> Result<()> {
    for kind in kinds {
        let ratios = compute_ratios(store, *kind)?;
        writer.write_all(render_section(kind.title(), &ratios, n).as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(country: &str, ratio: f64) -> RankedRatio {
        RankedRatio {
            country: country.to_string(),
            ratio,
        }
    }

    #[test]
    fn test_render_section_layout() {
        let ratios = vec![ranked("Suisse", 2.4149), ranked("Japon", 1.8751), ranked("Norvège", 1.0)];
        let text = render_section("Top ... des pays par indemnité/Revenu Médian:", &ratios, 2);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Top 2 des pays par indemnité/Revenu Médian:");
        assert_eq!(lines[1].len(), lines[0].chars().count());
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2], "Suisse : 2.41");
        assert_eq!(lines[3], "Japon : 1.88");
        assert_eq!(lines[4], "");
        assert_eq!(lines.len(), 5);
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_render_section_fewer_rows_than_n() {
        let text = render_section("Top ... des pays:", &[ranked("France", 0.4)], 10);
        assert_eq!(text, "Top 10 des pays:\n----------------\nFrance : 0.40\n\n");
    }

    #[test]
    fn test_write_report_sections_in_order() {
        let store = RecordStore::from_json_str(
            r#"{"France": {"INDEMNITE TOTALE": "1000", "Last PIB": "30000", "medianIncome": "2000"}}"#,
        )
        .unwrap();

        let mut out = Vec::new();
        write_report(
            &mut out,
            &store,
            &[RatioKind::IndemnityByGdp, RatioKind::IndemnityByMedianIncome],
            10,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let gdp = text.find("Top 10 des pays par indemnité/PIB par habitant:").unwrap();
        let median = text.find("Top 10 des pays par indemnité/Revenu Médian:").unwrap();
        assert!(gdp < median);
        assert!(text.contains("France : 0.40\n"));
        assert!(text.contains("France : 0.50\n"));
    }
}
