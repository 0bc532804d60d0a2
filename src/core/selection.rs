//! The current build: at most one canonical part per category

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::normalize::{normalize, CanonicalPart};
use crate::entities::part::{Category, Part};

/// A (possibly partial) selection of one part per category
///
/// The engine only ever borrows a selection. What-if questions are
/// answered on copies built with [`Selection::substituted`] and
/// [`Selection::without`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    parts: BTreeMap<Category, CanonicalPart>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from raw parts, normalizing each
    pub fn from_parts<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = (Category, &'a Part)>,
    {
        let mut selection = Self::new();
        for (category, part) in parts {
            selection.set(normalize(part, category));
        }
        selection
    }

    /// Builder form of [`Selection::set`]
    pub fn with(mut self, part: CanonicalPart) -> Self {
        self.set(part);
        self
    }

    /// Select `part` in its own category, replacing any previous choice
    pub fn set(&mut self, part: CanonicalPart) {
        self.parts.insert(part.category, part);
    }

    pub fn clear(&mut self, category: Category) {
        self.parts.remove(&category);
    }

    pub fn get(&self, category: Category) -> Option<&CanonicalPart> {
        self.parts.get(&category)
    }

    pub fn is_selected(&self, category: Category) -> bool {
        self.parts.contains_key(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Selected parts in category order
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalPart> {
        self.parts.values()
    }

    /// A copy with `part` substituted into its category
    pub fn substituted(&self, part: CanonicalPart) -> Self {
        self.clone().with(part)
    }

    /// A copy with `category` unselected
    pub fn without(&self, category: Category) -> Self {
        let mut copy = self.clone();
        copy.clear(category);
        copy
    }
}
