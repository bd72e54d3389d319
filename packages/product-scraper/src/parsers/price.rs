//! Price parsing.

use regex::Regex;
use std::sync::LazyLock;

static RE_PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$?(\d+\.?\d*)").unwrap());

/// First price-looking number in the text, with or without a dollar sign.
pub fn parse_price(text: &str) -> Option<f64> {
    RE_PRICE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|price| price.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$3.99/each"), Some(3.99));
        assert_eq!(parse_price("Price 12"), Some(12.0));
        assert_eq!(parse_price("5. per pound"), Some(5.0));
        assert_eq!(parse_price("call for price"), None);
        assert_eq!(parse_price(&"9".repeat(400)), None);
    }
}
