//! Prebuilt estimate entries and the two catalog shapes they arrive in
//!
//! Keyed by use-case:
//!
//! ```json
//! { "gaming": [ { "budget": 150, "config": { "cpu": "...", "mobo": "..." }, "note": "..." } ] }
//! ```
//!
//! Flat:
//!
//! ```json
//! [ { "name": "...", "totalPrice": 1200, "parts": [ { "category": "cpu", "name": "..." } ] } ]
//! ```
//!
//! Both deserialize into [`EstimateCatalog`]; entries normalize into
//! [`EstimateEntry`] whatever their field names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::core::normalize::{coerce_number, coerce_string};

/// Display order for estimate part rows; unknown categories follow alphabetically
const PART_ORDER: &[&str] = &["cpu", "board", "mobo", "motherboard", "ram", "gpu", "storage", "psu", "case"];

/// One named part inside an estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatePart {
    pub category: String,
    pub name: String,
}

impl EstimatePart {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }
}

/// A prebuilt configuration with its price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEstimateEntry")]
pub struct EstimateEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// `budget` or `totalPrice`
    pub price: f64,
    pub parts: Vec<EstimatePart>,
}

impl EstimateEntry {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: Some(name.into()),
            note: None,
            price,
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, category: impl Into<String>, name: impl Into<String>) -> Self {
        self.parts.push(EstimatePart::new(category, name));
        self
    }

    /// Heading for display: name, else note, else a placeholder
    pub fn title(&self) -> &str {
        self.name
            .as_deref()
            .or(self.note.as_deref())
            .unwrap_or("Recommended build")
    }

    /// Name of the part listed under `category`, if any
    pub fn part(&self, category: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|p| p.category.eq_ignore_ascii_case(category))
            .map(|p| p.name.as_str())
    }
}

/// Wire form accepting both entry shapes
#[derive(Deserialize)]
struct RawEstimateEntry {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    note: Option<Value>,
    #[serde(default)]
    budget: Option<Value>,
    #[serde(default, rename = "totalPrice", alias = "total_price")]
    total_price: Option<Value>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    config: Option<Value>,
    #[serde(default)]
    parts: Option<Value>,
}

impl From<RawEstimateEntry> for EstimateEntry {
    fn from(raw: RawEstimateEntry) -> Self {
        let text = |value: Option<Value>| {
            value
                .map(|v| coerce_string(&v))
                .filter(|s| !s.is_empty())
        };

        let price = [raw.budget, raw.total_price, raw.price]
            .into_iter()
            .flatten()
            .find(|v| !v.is_null())
            .map(|v| coerce_number(&v))
            .unwrap_or(0.0);

        // A `parts` or `config` of the wrong shape contributes no parts
        let parts = match (raw.parts, raw.config) {
            (Some(Value::Array(list)), _) => list
                .into_iter()
                .filter_map(|item| serde_json::from_value::<EstimatePart>(item).ok())
                .filter(|p| !p.category.is_empty())
                .collect(),
            (_, Some(Value::Object(config))) => config_parts(config),
            _ => Vec::new(),
        };

        Self {
            name: text(raw.name),
            note: text(raw.note),
            price,
            parts,
        }
    }
}

/// Flatten a `config` mapping into rows in display order
fn config_parts(config: Map<String, Value>) -> Vec<EstimatePart> {
    let rank = |category: &str| {
        PART_ORDER
            .iter()
            .position(|known| known.eq_ignore_ascii_case(category))
            .unwrap_or(PART_ORDER.len())
    };

    let mut parts: Vec<EstimatePart> = config
        .into_iter()
        .map(|(category, value)| EstimatePart::new(category, coerce_string(&value)))
        .filter(|p| !p.name.is_empty())
        .collect();
    // Map keys arrive sorted, so the sort is stable among unknown categories
    parts.sort_by_key(|p| rank(&p.category));
    parts
}

/// An estimate catalog in either accepted shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EstimateCatalog {
    /// `[ {name, totalPrice, parts}, ... ]`
    Flat(Vec<EstimateEntry>),
    /// `{ use_case: [ {budget, config, note}, ... ] }`
    ByUseCase(BTreeMap<String, Vec<EstimateEntry>>),
}

impl Default for EstimateCatalog {
    fn default() -> Self {
        EstimateCatalog::Flat(Vec::new())
    }
}

impl EstimateCatalog {
    /// Entries for a use-case tag
    ///
    /// The keyed shape returns that tag's list (tags compare
    /// case-insensitively; unknown tags give nothing) or every list when no
    /// tag is given. The flat shape carries no tags and always returns the
    /// whole list.
    pub fn entries(&self, use_case: Option<&str>) -> Vec<&EstimateEntry> {
        match (self, use_case) {
            (EstimateCatalog::Flat(list), _) => list.iter().collect(),
            (EstimateCatalog::ByUseCase(map), None) => map.values().flatten().collect(),
            (EstimateCatalog::ByUseCase(map), Some(tag)) => map
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(tag.trim()))
                .map(|(_, list)| list.iter().collect())
                .unwrap_or_default(),
        }
    }

    /// Declared use-case tags (empty for the flat shape)
    pub fn use_cases(&self) -> Vec<&str> {
        match self {
            EstimateCatalog::Flat(_) => Vec::new(),
            EstimateCatalog::ByUseCase(map) => map.keys().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            EstimateCatalog::Flat(list) => list.is_empty(),
            EstimateCatalog::ByUseCase(map) => map.values().all(Vec::is_empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> EstimateCatalog {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_keyed_shape() {
        let catalog = parse(json!({
            "office": [
                {"budget": 60, "config": {"psu": "P", "cpu": "C", "storage": "S", "mobo": "B", "case": "K", "ram": "R", "gpu": "G"}, "note": "Light work"}
            ],
            "gaming": [
                {"budget": 150, "config": {"cpu": "C2"}}
            ]
        }));
        assert_eq!(catalog.use_cases(), vec!["gaming", "office"]);

        let office = catalog.entries(Some("office"));
        assert_eq!(office.len(), 1);
        assert_eq!(office[0].price, 60.0);
        assert_eq!(office[0].title(), "Light work");
        let order: Vec<&str> = office[0].parts.iter().map(|p| p.category.as_str()).collect();
        assert_eq!(order, vec!["cpu", "mobo", "ram", "gpu", "storage", "psu", "case"]);
    }

    #[test]
    fn test_flat_shape() {
        let catalog = parse(json!([
            {"name": "Starter", "totalPrice": 800, "parts": [
                {"category": "gpu", "name": "G"},
                {"category": "cpu", "name": "C"}
            ], "note": "1080p"}
        ]));
        let entries = catalog.entries(Some("gaming"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title(), "Starter");
        assert_eq!(entries[0].note.as_deref(), Some("1080p"));
        assert_eq!(entries[0].price, 800.0);
        // Listed order is kept for the flat shape
        assert_eq!(entries[0].parts[0].category, "gpu");
        assert_eq!(entries[0].part("CPU"), Some("C"));
    }

    #[test]
    fn test_unknown_use_case_is_empty() {
        let catalog = parse(json!({"office": [{"budget": 60}]}));
        assert!(catalog.entries(Some("server")).is_empty());
        assert_eq!(catalog.entries(Some(" Office ")).len(), 1);
        assert_eq!(catalog.entries(None).len(), 1);
    }

    #[test]
    fn test_price_fields_and_coercion() {
        let catalog = parse(json!([
            {"name": "A", "budget": "120"},
            {"name": "B", "total_price": 99.5},
            {"name": "C", "price": "n/a"},
            {"name": "D"}
        ]));
        let prices: Vec<f64> = catalog.entries(None).iter().map(|e| e.price).collect();
        assert_eq!(prices, vec![120.0, 99.5, 0.0, 0.0]);
    }

    #[test]
    fn test_malformed_part_rows_are_dropped() {
        let catalog = parse(json!([
            {"name": "A", "parts": [{"category": "cpu", "name": "C"}, "junk", {"name": "no category"}]}
        ]));
        assert_eq!(catalog.entries(None)[0].parts.len(), 1);
    }

    #[test]
    fn test_misshapen_parts_or_config_keep_the_entry() {
        let flat = parse(json!([
            {"name": "ok", "totalPrice": 100, "parts": [{"category": "cpu", "name": "C"}]},
            {"name": "bad", "totalPrice": 200, "parts": "oops"}
        ]));
        let entries = flat.entries(None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].parts.len(), 1);
        assert_eq!(entries[1].price, 200.0);
        assert!(entries[1].parts.is_empty());

        let keyed = parse(json!({
            "office": [
                {"budget": 60, "config": {"cpu": "C"}},
                {"budget": 70, "config": "oops"},
                {"budget": 80, "config": ["C"]}
            ]
        }));
        let office = keyed.entries(Some("office"));
        assert_eq!(office.len(), 3);
        assert_eq!(office[0].part("cpu"), Some("C"));
        assert!(office[1].parts.is_empty());
        assert!(office[2].parts.is_empty());
    }

    #[test]
    fn test_title_fallback() {
        let entry: EstimateEntry = serde_json::from_value(json!({"budget": 10})).unwrap();
        assert_eq!(entry.title(), "Recommended build");
    }

    #[test]
    fn test_is_empty() {
        assert!(EstimateCatalog::default().is_empty());
        assert!(parse(json!({"office": []})).is_empty());
        assert!(!parse(json!([{"budget": 1}])).is_empty());
    }
}
