//! Field normalizer - maps drifting catalog keys onto canonical fields
//!
//! Catalogs disagree on key names (a GPU's length may be `length`,
//! `length_mm` or `gpu_length`). [`ALIAS_TABLE`] declares, per canonical
//! field, the ordered list of raw keys to try. [`normalize`] never
//! fails: an absent or malformed value becomes the field's default.

use serde::Serialize;
use serde_json::Value;

use crate::entities::part::{Category, Part};

/// Canonical field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Model,
    Socket,
    RamType,
    FormFactor,
    Forms,
    Length,
    GpuMaxLength,
    Power,
    Capacity,
}

/// Ordered aliases for one canonical field within a set of categories
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub field: Field,
    pub categories: &'static [Category],
    pub aliases: &'static [&'static str],
}

impl FieldAliases {
    const fn new(
        field: Field,
        categories: &'static [Category],
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            field,
            categories,
            aliases,
        }
    }
}

/// Declared alias table. Earlier aliases win.
pub const ALIAS_TABLE: &[FieldAliases] = &[
    FieldAliases::new(Field::Model, &Category::ALL, &["model", "name"]),
    FieldAliases::new(Field::Socket, &[Category::Cpu, Category::Board], &["socket"]),
    FieldAliases::new(Field::RamType, &[Category::Board], &["ramType", "ram_type", "ram"]),
    FieldAliases::new(Field::RamType, &[Category::Ram], &["type", "ramType", "ram_type"]),
    FieldAliases::new(Field::FormFactor, &[Category::Board], &["formFactor", "form", "form_factor"]),
    FieldAliases::new(Field::FormFactor, &[Category::Case], &["formFactor", "form_factor"]),
    FieldAliases::new(Field::Forms, &[Category::Case], &["forms"]),
    FieldAliases::new(Field::Length, &[Category::Gpu], &["length", "length_mm", "gpu_length"]),
    FieldAliases::new(
        Field::GpuMaxLength,
        &[Category::Case],
        &["gpuMaxLength", "maxGpuMm", "max_gpu_mm"],
    ),
    FieldAliases::new(
        Field::Power,
        &[Category::Cpu, Category::Gpu, Category::Ram],
        &["power", "tdp"],
    ),
    FieldAliases::new(Field::Capacity, &[Category::Psu], &["capacity", "watt", "wattage"]),
];

/// Aliases for a field in a category; empty when the field does not apply
pub fn aliases(category: Category, field: Field) -> &'static [&'static str] {
    ALIAS_TABLE
        .iter()
        .find(|entry| entry.field == field && entry.categories.contains(&category))
        .map(|entry| entry.aliases)
        .unwrap_or(&[])
}

/// A part with every canonical field resolved
///
/// Fields that do not apply to the part's category keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalPart {
    pub category: Category,
    pub model: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub socket: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ram_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub form_factor: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forms: Vec<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub length_mm: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub gpu_max_length_mm: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub power_w: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub capacity_w: f64,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

impl CanonicalPart {
    /// An empty part of the given category (all fields at their defaults)
    pub fn empty(category: Category, model: impl Into<String>) -> Self {
        Self {
            category,
            model: model.into(),
            socket: String::new(),
            ram_type: String::new(),
            form_factor: String::new(),
            forms: Vec::new(),
            length_mm: 0.0,
            gpu_max_length_mm: 0.0,
            power_w: 0.0,
            capacity_w: 0.0,
        }
    }

    /// Short attribute summary for list output (e.g. "AM4, 65W")
    pub fn summary(&self) -> String {
        let mut bits = Vec::new();
        match self.category {
            Category::Cpu => {
                push_str(&mut bits, &self.socket);
                push_num(&mut bits, self.power_w, "W");
            }
            Category::Board => {
                push_str(&mut bits, &self.socket);
                push_str(&mut bits, &self.ram_type);
                push_str(&mut bits, &self.form_factor);
            }
            Category::Ram => {
                push_str(&mut bits, &self.ram_type);
                push_num(&mut bits, self.power_w, "W");
            }
            Category::Gpu => {
                push_num(&mut bits, self.length_mm, "mm");
                push_num(&mut bits, self.power_w, "W");
            }
            Category::Psu => push_num(&mut bits, self.capacity_w, "W"),
            Category::Case => {
                if self.forms.is_empty() {
                    push_str(&mut bits, &self.form_factor);
                } else {
                    bits.push(self.forms.join("/"));
                }
                if self.gpu_max_length_mm > 0.0 {
                    bits.push(format!("GPU <= {}mm", format_number(self.gpu_max_length_mm)));
                }
            }
        }
        bits.join(", ")
    }
}

fn push_str(bits: &mut Vec<String>, value: &str) {
    if !value.is_empty() {
        bits.push(value.to_string());
    }
}

fn push_num(bits: &mut Vec<String>, value: f64, unit: &str) {
    if value > 0.0 {
        bits.push(format!("{}{}", format_number(value), unit));
    }
}

/// Render a number without a trailing ".0" for whole values
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Resolve every canonical field of `part` as a `category` part
pub fn normalize(part: &Part, category: Category) -> CanonicalPart {
    let text = |field| first_present(part, aliases(category, field)).map(coerce_string).unwrap_or_default();
    let number = |field| first_present(part, aliases(category, field)).map(coerce_number).unwrap_or(0.0);

    CanonicalPart {
        category,
        model: text(Field::Model),
        socket: text(Field::Socket),
        ram_type: text(Field::RamType),
        form_factor: text(Field::FormFactor),
        forms: first_present(part, aliases(category, Field::Forms))
            .map(coerce_set)
            .unwrap_or_default(),
        length_mm: number(Field::Length),
        gpu_max_length_mm: number(Field::GpuMaxLength),
        power_w: number(Field::Power),
        capacity_w: number(Field::Capacity),
    }
}

/// The selection key of a raw part, independent of category
pub fn model_of(part: &Part) -> String {
    first_present(part, aliases(Category::Cpu, Field::Model))
        .map(coerce_string)
        .unwrap_or_default()
}

/// First alias present with a non-null value
fn first_present<'a>(part: &'a Part, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| part.get(key))
        .find(|value| !value.is_null())
}

/// Coerce to a non-negative finite number; anything else is 0
pub fn coerce_number(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(n) if n.is_finite() && n >= 0.0 => n,
        _ => 0.0,
    }
}

/// Coerce to text; numbers are rendered, other shapes are empty
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Coerce to an ordered, de-duplicated set of strings
pub fn coerce_set(value: &Value) -> Vec<String> {
    let items: Vec<String> = match value {
        Value::Array(items) => items.iter().map(coerce_string).collect(),
        Value::String(_) | Value::Number(_) => vec![coerce_string(value)],
        _ => Vec::new(),
    };

    let mut set: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_empty() && !set.contains(&item) {
            set.push(item);
        }
    }
    set
}
