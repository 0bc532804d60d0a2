//! Part records and the categories they belong to
//!
//! A [`Part`] is a raw catalog record exactly as it appears in the JSON
//! files: a flat mapping whose key names drift between catalogs. Nothing
//! reads a `Part` directly except the field normalizer, which turns it
//! into a [`CanonicalPart`](crate::core::normalize::CanonicalPart).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Part categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Processor
    Cpu,
    /// Motherboard
    Board,
    /// Memory kit
    Ram,
    /// Graphics card
    Gpu,
    /// Power supply
    Psu,
    /// Chassis
    Case,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 6] = [
        Category::Cpu,
        Category::Board,
        Category::Ram,
        Category::Gpu,
        Category::Psu,
        Category::Case,
    ];

    /// Get the canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::Board => "board",
            Category::Ram => "ram",
            Category::Gpu => "gpu",
            Category::Psu => "psu",
            Category::Case => "case",
        }
    }

    /// Human-readable label for headings
    pub fn label(&self) -> &'static str {
        match self {
            Category::Cpu => "CPU",
            Category::Board => "Motherboard",
            Category::Ram => "RAM",
            Category::Gpu => "GPU",
            Category::Psu => "PSU",
            Category::Case => "Case",
        }
    }

    /// File stems tried (in order) when loading this category from a catalog directory
    pub fn file_stems(&self) -> &'static [&'static str] {
        match self {
            Category::Cpu => &["cpu"],
            Category::Board => &["board", "mobo", "motherboard"],
            Category::Ram => &["ram"],
            Category::Gpu => &["gpu"],
            Category::Psu => &["psu"],
            Category::Case => &["case", "chassis"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" | "processor" => Ok(Category::Cpu),
            "board" | "mobo" | "motherboard" | "mainboard" => Ok(Category::Board),
            "ram" | "memory" => Ok(Category::Ram),
            "gpu" | "graphics" => Ok(Category::Gpu),
            "psu" | "power" => Ok(Category::Psu),
            "case" | "chassis" => Ok(Category::Case),
            _ => Err(format!(
                "Unknown category: {} (expected cpu, board, ram, gpu, psu or case)",
                s
            )),
        }
    }
}

/// A raw catalog record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Part(Map<String, Value>);

impl Part {
    /// Build a part from a JSON value; only objects are parts
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Raw field lookup by exact key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The selection key: `model`, falling back to `name`
    pub fn model(&self) -> String {
        crate::core::normalize::model_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_from_str_aliases() {
        assert_eq!("cpu".parse::<Category>().unwrap(), Category::Cpu);
        assert_eq!("mobo".parse::<Category>().unwrap(), Category::Board);
        assert_eq!("Motherboard".parse::<Category>().unwrap(), Category::Board);
        assert_eq!("chassis".parse::<Category>().unwrap(), Category::Case);
        assert!("storage".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_order_matches_all() {
        let mut sorted = Category::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::ALL.to_vec());
    }

    #[test]
    fn test_part_from_value() {
        assert!(Part::from_value(json!({"model": "X"})).is_some());
        assert!(Part::from_value(json!(["not", "a", "part"])).is_none());
        assert!(Part::from_value(json!(42)).is_none());
    }

    #[test]
    fn test_part_model_falls_back_to_name() {
        let part = Part::from_value(json!({"name": "Ryzen 5 5600"})).unwrap();
        assert_eq!(part.model(), "Ryzen 5 5600");
    }
}
