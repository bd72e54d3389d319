//! Allergen statement parsing.

use regex::Regex;
use std::sync::LazyLock;

use super::RE_LIST_SEPARATOR;

/// Label patterns, each capturing up to the next sentence terminator.
static ALLERGEN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)contains:\s*([^.]*)",
        r"(?i)allergens:\s*([^.]*)",
        r"(?i)may contain:\s*([^.]*)",
        r"(?i)manufactured in a facility that processes:\s*([^.]*)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static RE_LEADING_CONTAINS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*contains:?\s*").unwrap());

fn split_normalized(text: &str, out: &mut Vec<String>) {
    out.extend(
        RE_LIST_SEPARATOR
            .split(text)
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty()),
    );
}

/// Extract allergens from labelled statements.
///
/// Matches of every pattern are unioned in pattern order. Overlapping labels
/// ("contains:" inside "may contain:") can report the same allergen twice;
/// duplicates are kept.
pub fn parse_allergens(text: &str) -> Option<Vec<String>> {
    let mut allergens = Vec::new();
    for pattern in ALLERGEN_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                split_normalized(m.as_str(), &mut allergens);
            }
        }
    }
    (!allergens.is_empty()).then_some(allergens)
}

/// Parse an unlabelled allergen list such as the joined text of `<li>` items.
pub fn parse_allergen_list(text: &str) -> Option<Vec<String>> {
    let stripped = RE_LEADING_CONTAINS.replace(text, "");
    let mut allergens = Vec::new();
    split_normalized(&stripped, &mut allergens);
    (!allergens.is_empty()).then_some(allergens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_contains_statement() {
        let parsed = parse_allergens("CONTAINS: Milk, Wheat; Soy. Store in a cool place.");
        assert_eq!(parsed, Some(vec!["milk".into(), "wheat".into(), "soy".into()]));
    }

    #[test]
    fn test_union_keeps_duplicates() {
        let parsed = parse_allergens("May contain: tree nuts.").unwrap();
        // "contain:" is not "contains:", so only one pattern matches here
        assert_eq!(parsed, vec!["tree nuts"]);

        let parsed = parse_allergens("Contains: milk. Allergens: milk, eggs.").unwrap();
        assert_eq!(parsed, vec!["milk", "milk", "eggs"]);
    }

    #[test]
    fn test_facility_statement() {
        let parsed =
            parse_allergens("Manufactured in a facility that processes: peanuts, sesame.").unwrap();
        assert_eq!(parsed, vec!["peanuts", "sesame"]);
    }

    #[test]
    fn test_label_with_nothing_after_is_none() {
        assert_eq!(parse_allergens("Contains: ."), None);
    }

    #[test]
    fn test_allergen_list() {
        assert_eq!(
            parse_allergen_list("Contains Milk, Eggs"),
            Some(vec!["milk".into(), "eggs".into()])
        );
        assert_eq!(parse_allergen_list("  "), None);
    }

    proptest! {
        #[test]
        fn prop_unlabelled_text_has_no_allergens(s in "[a-zA-Z0-9 ,.]{0,80}") {
            prop_assume!(!s.contains(':'));
            prop_assert_eq!(parse_allergens(&s), None);
        }
    }
}
