//! Attribute key generation and comparison.
//!
//! Keys are machine identifiers derived once from a human label. Every
//! comparison between keys in this crate is case-insensitive; use
//! [`keys_match`] and [`fold_key`] rather than comparing strings directly.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Turn a free-text label into a machine-safe key.
///
/// Letters from the fixed transliteration table map to their ASCII base,
/// other accents are stripped, everything is lowercased, and each run of
/// characters outside `[a-z0-9]` collapses into one `_`. Leading and
/// trailing separators are removed, so a blank label yields an empty key.
#[must_use]
pub fn slugify(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let folded = trimmed
        .chars()
        .map(transliterate)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let mut key = String::with_capacity(folded.len());
    let mut pending_sep = false;

    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.push(c);
        } else {
            pending_sep = true;
        }
    }

    key
}

/// Case-insensitive key equality.
#[must_use]
pub fn keys_match(left: &str, right: &str) -> bool {
    left == right || fold_key(left) == fold_key(right)
}

/// Canonical case-folded form used for key lookups and duplicate checks.
#[must_use]
pub fn fold_key(key: &str) -> String {
    key.to_lowercase()
}

// Fixed table; applied before general diacritic stripping because the
// dotless/dotted i forms do not decompose to a plain ASCII `i`.
const fn transliterate(c: char) -> char {
    match c {
        'Ç' | 'ç' => 'c',
        'Ğ' | 'ğ' => 'g',
        'İ' | 'I' | 'ı' => 'i',
        'Ö' | 'ö' => 'o',
        'Ş' | 'ş' => 's',
        'Ü' | 'ü' => 'u',
        other => other,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_simple_labels() {
        assert_eq!(slugify("Renk"), "renk");
        assert_eq!(slugify("Serial Number"), "serial_number");
        assert_eq!(slugify("  Weight (kg)  "), "weight_kg");
    }

    #[test]
    fn slugify_transliterates_turkish_letters() {
        assert_eq!(slugify("Çalışma Şekli"), "calisma_sekli");
        assert_eq!(slugify("İşletim Sistemi"), "isletim_sistemi");
        assert_eq!(slugify("ÖĞÜ"), "ogu");
    }

    #[test]
    fn slugify_strips_other_diacritics() {
        assert_eq!(slugify("Café Crème"), "cafe_creme");
        assert_eq!(slugify("Año"), "ano");
    }

    #[test]
    fn slugify_collapses_separators_and_trims_edges() {
        assert_eq!(slugify("A/B (C)"), "a_b_c");
        assert_eq!(slugify("--x--y--"), "x_y");
        assert_eq!(slugify("renk!!"), "renk");
    }

    #[test]
    fn slugify_blank_is_empty() {
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_is_deterministic_and_may_collide() {
        assert_eq!(slugify("Renk"), slugify("Renk"));
        assert_eq!(slugify("Renk"), slugify("renk!!"));
    }

    #[test]
    fn keys_compare_case_insensitively() {
        assert!(keys_match("Marka", "marka"));
        assert!(keys_match("SERIAL", "serial"));
        assert!(!keys_match("serial", "serial_no"));
    }
}
