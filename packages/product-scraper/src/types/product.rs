//! Product records produced by the extractor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Name used when no strategy or title fallback yields a product name.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Outcome of a single scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScrapeStatus::Pending => "pending",
            ScrapeStatus::Success => "success",
            ScrapeStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Fixed nutrient vocabulary.
///
/// Declaration order is the order labels are tested against table rows,
/// so more specific labels ("saturated fat") come before looser ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    ServingSize,
    ServingsPerContainer,
    Calories,
    TotalFat,
    SaturatedFat,
    TransFat,
    Cholesterol,
    Sodium,
    TotalCarbohydrates,
    DietaryFiber,
    Sugars,
    Protein,
}

impl Nutrient {
    /// Every nutrient, in matching order.
    pub const ALL: [Nutrient; 12] = [
        Nutrient::ServingSize,
        Nutrient::ServingsPerContainer,
        Nutrient::Calories,
        Nutrient::TotalFat,
        Nutrient::SaturatedFat,
        Nutrient::TransFat,
        Nutrient::Cholesterol,
        Nutrient::Sodium,
        Nutrient::TotalCarbohydrates,
        Nutrient::DietaryFiber,
        Nutrient::Sugars,
        Nutrient::Protein,
    ];

    /// Storage key.
    pub fn key(&self) -> &'static str {
        match self {
            Nutrient::ServingSize => "serving_size",
            Nutrient::ServingsPerContainer => "servings_per_container",
            Nutrient::Calories => "calories",
            Nutrient::TotalFat => "total_fat",
            Nutrient::SaturatedFat => "saturated_fat",
            Nutrient::TransFat => "trans_fat",
            Nutrient::Cholesterol => "cholesterol",
            Nutrient::Sodium => "sodium",
            Nutrient::TotalCarbohydrates => "total_carbohydrates",
            Nutrient::DietaryFiber => "dietary_fiber",
            Nutrient::Sugars => "sugars",
            Nutrient::Protein => "protein",
        }
    }

    /// Lowercase label fragment used when matching nutrition table rows.
    pub fn table_label(&self) -> &'static str {
        match self {
            Nutrient::ServingSize => "serving size",
            Nutrient::ServingsPerContainer => "servings per container",
            Nutrient::Calories => "calories",
            Nutrient::TotalFat => "total fat",
            Nutrient::SaturatedFat => "saturated fat",
            Nutrient::TransFat => "trans fat",
            Nutrient::Cholesterol => "cholesterol",
            Nutrient::Sodium => "sodium",
            Nutrient::TotalCarbohydrates => "total carbohydrate",
            Nutrient::DietaryFiber => "dietary fiber",
            Nutrient::Sugars => "sugars",
            Nutrient::Protein => "protein",
        }
    }

    /// Serving descriptions are free text rather than quantities.
    pub fn is_textual(&self) -> bool {
        matches!(self, Nutrient::ServingSize | Nutrient::ServingsPerContainer)
    }
}

/// A nutrient amount: numeric when it parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NutrientValue {
    Number(f64),
    Text(String),
}

impl NutrientValue {
    /// Parse a captured value, keeping the raw text when it is not a
    /// finite number. "NaN" and "inf" stay text since JSON cannot carry them.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => NutrientValue::Number(n),
            _ => NutrientValue::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NutrientValue::Number(n) => Some(*n),
            NutrientValue::Text(_) => None,
        }
    }
}

/// Nutrition facts keyed by the fixed vocabulary.
pub type NutritionFacts = BTreeMap<Nutrient, NutrientValue>;

/// A scraped product.
///
/// Records are built once by the extractor (or its fault handler) and never
/// mutated after they are stored. Re-scraping a URL produces a new record
/// with a new id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Unique id generated at creation
    pub id: Uuid,

    /// Canonical page URL
    pub source_url: String,

    /// Product name, `UNKNOWN_PRODUCT` when nothing could be extracted
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Normalized ingredient list, possibly empty
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Allergens in statement order; duplicates across label patterns are kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_facts: Option<NutritionFacts>,

    pub scraped_at: DateTime<Utc>,

    pub scrape_duration_seconds: f64,

    pub status: ScrapeStatus,

    /// Fault description, present only on failed records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub extractor_version: String,
}

impl ProductRecord {
    /// Create a pending record for a URL.
    pub fn new(source_url: impl Into<String>, extractor_version: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_url: source_url.into(),
            name: UNKNOWN_PRODUCT.to_string(),
            brand: None,
            description: None,
            price: None,
            ingredients: Vec::new(),
            allergens: None,
            nutrition_facts: None,
            scraped_at: Utc::now(),
            scrape_duration_seconds: 0.0,
            status: ScrapeStatus::Pending,
            error_message: None,
            extractor_version: extractor_version.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_brand(mut self, brand: Option<String>) -> Self {
        self.brand = brand;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_price(mut self, price: Option<f64>) -> Self {
        self.price = price;
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<String>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_allergens(mut self, allergens: Option<Vec<String>>) -> Self {
        self.allergens = allergens;
        self
    }

    pub fn with_nutrition_facts(mut self, nutrition_facts: Option<NutritionFacts>) -> Self {
        self.nutrition_facts = nutrition_facts;
        self
    }

    /// Finish as a successful scrape.
    pub fn succeeded(mut self, duration_seconds: f64) -> Self {
        self.status = ScrapeStatus::Success;
        self.error_message = None;
        self.scrape_duration_seconds = duration_seconds.max(0.0);
        self.scraped_at = Utc::now();
        self
    }

    /// Finish as a failed scrape carrying the fault description.
    pub fn failed(mut self, error: impl Into<String>, duration_seconds: f64) -> Self {
        self.status = ScrapeStatus::Failed;
        self.error_message = Some(error.into());
        self.scrape_duration_seconds = duration_seconds.max(0.0);
        self.scraped_at = Utc::now();
        self
    }

    /// Whether the record carries the fields a usable product needs.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.source_url.is_empty() && !self.ingredients.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.status == ScrapeStatus::Success
    }
}
