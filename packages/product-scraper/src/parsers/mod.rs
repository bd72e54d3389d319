//! Pure text-to-structure parsers.
//!
//! No I/O happens here. The extractor locates text on a page and hands it
//! to these functions; they never fail, they only find less.

pub mod allergens;
pub mod ingredients;
pub mod nutrition;
pub mod price;

pub use allergens::{parse_allergen_list, parse_allergens};
pub use ingredients::parse_ingredients;
pub use nutrition::{parse_nutrition_from_table, parse_nutrition_from_text};
pub use price::parse_price;

use regex::Regex;
use std::sync::LazyLock;

/// Separator between list entries in ingredient and allergen statements.
pub(crate) static RE_LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;]").unwrap());
