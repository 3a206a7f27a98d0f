//! Country name normalization
//!
//! Produces the comparison key used by the matcher: diacritics folded to
//! ASCII, uppercased, and reduced to `A-Z` plus the ASCII space.
//!
//! ```text
//! "Côte d'Ivoire"  → "COTE DIVOIRE"
//! "São Tomé"       → "SAO TOME"
//! "Bosnie-Herzégovine" → "BOSNIEHERZEGOVINE"
//! ```

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a display name into a comparison key.
///
/// Never fails. Empty or symbol-only input yields an empty string, and the
/// function is idempotent.
pub fn normalize_name(name: &str) -> String {
    fold_ligatures(name)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_uppercase() || *c == ' ')
        .collect()
}

/// Letters that do not decompose under NFD get an explicit ASCII spelling.
fn fold_ligatures(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            'Œ' | 'œ' => out.push_str("OE"),
            'Æ' | 'æ' => out.push_str("AE"),
            'ß' | 'ẞ' => out.push_str("SS"),
            'Þ' | 'þ' => out.push_str("TH"),
            'Ø' | 'ø' => out.push('O'),
            'Ł' | 'ł' => out.push('L'),
            'Đ' | 'đ' => out.push('D'),
            'Ħ' | 'ħ' => out.push('H'),
            'ı' => out.push('I'),
            _ => out.push(c),
        }
    }
    out
}
