//! Ingredient list parsing.

use regex::Regex;
use std::sync::LazyLock;

use super::RE_LIST_SEPARATOR;

static RE_CONTAINS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^contains\s+").unwrap());
static RE_INGREDIENTS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ingredients:\s*").unwrap());

/// Split an ingredient statement into normalized entries.
///
/// Entries are split on `,` and `;`, trimmed, lowercased, and stripped of a
/// leading `contains ` or `ingredients:` label. Empty entries are dropped.
pub fn parse_ingredients(text: &str) -> Vec<String> {
    RE_LIST_SEPARATOR
        .split(text)
        .filter_map(|token| {
            let token = token.trim().to_lowercase();
            if token.is_empty() {
                return None;
            }
            let token = RE_CONTAINS_PREFIX.replace(&token, "");
            let token = RE_INGREDIENTS_PREFIX.replace(&token, "");
            let token = token.trim();
            (!token.is_empty()).then(|| token.to_string())
        })
        .collect()
}
