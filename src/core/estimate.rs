//! Estimate matcher - nearest-budget and price-range lookups

use crate::entities::estimate::EstimateEntry;

/// Entry whose price is closest to `target`
///
/// Ties go to the earliest entry. An empty list gives `None`.
pub fn find_closest<'a, I>(entries: I, target: f64) -> Option<&'a EstimateEntry>
where
    I: IntoIterator<Item = &'a EstimateEntry>,
{
    let mut best: Option<(&EstimateEntry, f64)> = None;
    for entry in entries {
        let distance = (entry.price - target).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((entry, distance)),
        }
    }
    best.map(|(entry, _)| entry)
}

/// Entries priced within `[min, max]`, in catalog order
///
/// An inverted range matches nothing.
pub fn filter_by_range<'a, I>(entries: I, min: f64, max: f64) -> Vec<&'a EstimateEntry>
where
    I: IntoIterator<Item = &'a EstimateEntry>,
{
    entries
        .into_iter()
        .filter(|entry| min <= entry.price && entry.price <= max)
        .collect()
}
