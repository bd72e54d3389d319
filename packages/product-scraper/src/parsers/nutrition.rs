//! Nutrition fact parsing from free text and from table rows.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::product::{Nutrient, NutrientValue, NutritionFacts};

/// One regex per nutrient; group 1 captures the value.
static NUTRITION_PATTERNS: LazyLock<Vec<(Nutrient, Regex)>> = LazyLock::new(|| {
    [
        (Nutrient::ServingSize, r"(?i)serving size:\s*([^\n]*)"),
        (Nutrient::ServingsPerContainer, r"(?i)servings per container:\s*(\d+)"),
        (Nutrient::Calories, r"(?i)calories:\s*(\d+)"),
        (Nutrient::TotalFat, r"(?i)total fat:\s*(\d+(?:\.\d+)?)\s*g"),
        (Nutrient::SaturatedFat, r"(?i)saturated fat:\s*(\d+(?:\.\d+)?)\s*g"),
        (Nutrient::TransFat, r"(?i)trans fat:\s*(\d+(?:\.\d+)?)\s*g"),
        (Nutrient::Cholesterol, r"(?i)cholesterol:\s*(\d+)\s*mg"),
        (Nutrient::Sodium, r"(?i)sodium:\s*(\d+)\s*mg"),
        (
            Nutrient::TotalCarbohydrates,
            r"(?i)total carbohydrates?:\s*(\d+(?:\.\d+)?)\s*g",
        ),
        (Nutrient::DietaryFiber, r"(?i)dietary fiber:\s*(\d+(?:\.\d+)?)\s*g"),
        (Nutrient::Sugars, r"(?i)sugars:\s*(\d+(?:\.\d+)?)\s*g"),
        (Nutrient::Protein, r"(?i)protein:\s*(\d+(?:\.\d+)?)\s*g"),
    ]
    .into_iter()
    .map(|(nutrient, pattern)| (nutrient, Regex::new(pattern).unwrap()))
    .collect()
});

static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// Extract nutrition facts from a text block.
///
/// Keys without a match are omitted. Returns `None` when nothing matched.
pub fn parse_nutrition_from_text(text: &str) -> Option<NutritionFacts> {
    let mut facts = NutritionFacts::new();
    for (nutrient, pattern) in NUTRITION_PATTERNS.iter() {
        let Some(raw) = pattern.captures(text).and_then(|c| c.get(1)) else {
            continue;
        };
        let raw = raw.as_str().trim();
        if raw.is_empty() {
            continue;
        }
        facts.insert(*nutrient, NutrientValue::parse(raw));
    }
    (!facts.is_empty()).then_some(facts)
}

/// Extract nutrition facts from `(label, value)` rows of a nutrition table.
///
/// Labels match case-insensitively by substring, so "Total Carbohydrate"
/// and "Total Carbohydrates" both land on the same key. The first row to
/// match a key wins.
pub fn parse_nutrition_from_table<L, V>(rows: &[(L, V)]) -> Option<NutritionFacts>
where
    L: AsRef<str>,
    V: AsRef<str>,
{
    let mut facts = NutritionFacts::new();
    for (label, value) in rows {
        let label = label.as_ref().to_lowercase();
        let value = value.as_ref().trim();
        if value.is_empty() {
            continue;
        }

        let Some(nutrient) = Nutrient::ALL
            .iter()
            .find(|n| label.contains(n.table_label()))
        else {
            continue;
        };
        if facts.contains_key(nutrient) {
            continue;
        }

        let parsed = if nutrient.is_textual() {
            NutrientValue::Text(value.to_string())
        } else {
            match RE_NUMBER.find(value) {
                Some(m) => NutrientValue::parse(m.as_str()),
                None => NutrientValue::Text(value.to_string()),
            }
        };
        facts.insert(*nutrient, parsed);
    }
    (!facts.is_empty()).then_some(facts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_calories_and_protein_only() {
        let facts = parse_nutrition_from_text("Calories: 150\nProtein: 3g").unwrap();

        let mut expected = NutritionFacts::new();
        expected.insert(Nutrient::Calories, NutrientValue::Number(150.0));
        expected.insert(Nutrient::Protein, NutrientValue::Number(3.0));
        assert_eq!(facts, expected);
    }

    #[test]
    fn test_non_numeric_serving_size_survives_json() {
        let facts = parse_nutrition_from_text("Serving Size: NaN\nCalories: 150").unwrap();
        assert_eq!(facts[&Nutrient::ServingSize], NutrientValue::Text("NaN".into()));

        let json = serde_json::to_string(&facts).unwrap();
        let back: NutritionFacts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, facts);
    }

    #[test]
    fn test_full_label() {
        let text = "Serving Size: 2 cookies (30g)\n\
                    Servings Per Container: 8\n\
                    Calories: 140\n\
                    Total Fat: 6g\n\
                    Saturated Fat: 3.5 g\n\
                    Trans Fat: 0g\n\
                    Cholesterol: 10mg\n\
                    Sodium: 95 mg\n\
                    Total Carbohydrate: 20g\n\
                    Dietary Fiber: 1g\n\
                    Sugars: 9g\n\
                    Protein: 2g";
        let facts = parse_nutrition_from_text(text).unwrap();

        assert_eq!(facts.len(), 12);
        assert_eq!(
            facts[&Nutrient::ServingSize],
            NutrientValue::Text("2 cookies (30g)".into())
        );
        assert_eq!(facts[&Nutrient::ServingsPerContainer], NutrientValue::Number(8.0));
        assert_eq!(facts[&Nutrient::SaturatedFat], NutrientValue::Number(3.5));
        assert_eq!(facts[&Nutrient::Sodium], NutrientValue::Number(95.0));
        assert_eq!(facts[&Nutrient::TotalCarbohydrates], NutrientValue::Number(20.0));
    }

    #[test]
    fn test_no_match_is_none() {
        assert_eq!(parse_nutrition_from_text("Keep frozen."), None);
        assert_eq!(parse_nutrition_from_text(""), None);
    }

    #[test]
    fn test_table_rows() {
        let rows = vec![
            ("Serving Size", "1 cup (240ml)"),
            ("Calories", "110"),
            ("Saturated Fat", "1.5g 8%"),
            ("Total Fat", "2.5g"),
            ("Total Carbohydrates", "18g"),
            ("Vitamin D", "2mcg"),
            ("Calories from fat", "20"),
        ];
        let facts = parse_nutrition_from_table(&rows).unwrap();

        assert_eq!(facts.len(), 5);
        assert_eq!(
            facts[&Nutrient::ServingSize],
            NutrientValue::Text("1 cup (240ml)".into())
        );
        assert_eq!(facts[&Nutrient::Calories], NutrientValue::Number(110.0));
        assert_eq!(facts[&Nutrient::SaturatedFat], NutrientValue::Number(1.5));
        assert_eq!(facts[&Nutrient::TotalFat], NutrientValue::Number(2.5));
        assert_eq!(facts[&Nutrient::TotalCarbohydrates], NutrientValue::Number(18.0));
    }

    #[test]
    fn test_table_singular_carbohydrate_label() {
        let facts = parse_nutrition_from_table(&[("TOTAL CARBOHYDRATE", "31 g")]).unwrap();
        assert_eq!(facts[&Nutrient::TotalCarbohydrates], NutrientValue::Number(31.0));
    }

    #[test]
    fn test_empty_table_is_none() {
        let rows: Vec<(String, String)> = Vec::new();
        assert_eq!(parse_nutrition_from_table(&rows), None);
    }

    proptest! {
        #[test]
        fn prop_calories_value_round_trips(n in 0u32..100_000) {
            let facts = parse_nutrition_from_text(&format!("Calories: {n}")).unwrap();
            prop_assert_eq!(facts.len(), 1);
            prop_assert_eq!(facts[&Nutrient::Calories].as_f64(), Some(n as f64));
        }
    }
}
