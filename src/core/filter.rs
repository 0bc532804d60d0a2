//! Candidate filter - which catalog parts can still be chosen
//!
//! A candidate is kept when substituting it into the selection does not
//! introduce a blocking finding that involves its category. Blocking
//! rules that already fail with the category unset are pre-existing
//! problems between other parts; they are left for the evaluator to
//! report and are not held against any candidate.

use serde::Serialize;
use tracing::debug;

use crate::core::catalog::Catalog;
use crate::core::normalize::normalize;
use crate::core::rules::{Finding, RuleId, RuleSet};
use crate::core::selection::Selection;
use crate::entities::part::{Category, Part};

/// Parts of `catalog` that stay compatible if chosen as `target`
pub fn filter_options<'a>(
    selection: &Selection,
    target: Category,
    catalog: &'a [Part],
) -> Vec<&'a Part> {
    filter_options_with(RuleSet::all(), selection, target, catalog)
}

/// [`filter_options`] under an explicit rule set
pub fn filter_options_with<'a>(
    rules: RuleSet,
    selection: &Selection,
    target: Category,
    catalog: &'a [Part],
) -> Vec<&'a Part> {
    let baseline = selection.without(target);
    let preexisting = blocking_rules(rules, &baseline);

    catalog
        .iter()
        .filter(|part| introduces_no_conflict(rules, &baseline, &preexisting, target, part))
        .collect()
}

/// Whether a single candidate survives the filter
pub fn is_candidate_compatible(selection: &Selection, target: Category, candidate: &Part) -> bool {
    let rules = RuleSet::all();
    let baseline = selection.without(target);
    let preexisting = blocking_rules(rules, &baseline);
    introduces_no_conflict(rules, &baseline, &preexisting, target, candidate)
}

fn blocking_rules(rules: RuleSet, selection: &Selection) -> Vec<RuleId> {
    rules
        .evaluate(selection)
        .filter(|finding| finding.is_blocking())
        .map(|finding| finding.rule)
        .collect()
}

/// Blocking findings that choosing `candidate` as `target` would introduce
///
/// Empty exactly when the candidate survives [`filter_options`].
pub fn candidate_conflicts(
    selection: &Selection,
    target: Category,
    candidate: &Part,
) -> Vec<Finding> {
    let rules = RuleSet::all();
    let baseline = selection.without(target);
    let preexisting = blocking_rules(rules, &baseline);
    new_conflicts(rules, &baseline, &preexisting, target, candidate).collect()
}

fn new_conflicts<'a>(
    rules: RuleSet,
    baseline: &Selection,
    preexisting: &'a [RuleId],
    target: Category,
    candidate: &Part,
) -> impl Iterator<Item = Finding> + 'a {
    let hypothetical = baseline.substituted(normalize(candidate, target));
    let findings: Vec<Finding> = rules.evaluate(&hypothetical).collect();
    findings.into_iter().filter(move |finding| {
        finding.is_blocking() && finding.involves(target) && !preexisting.contains(&finding.rule)
    })
}

fn introduces_no_conflict(
    rules: RuleSet,
    baseline: &Selection,
    preexisting: &[RuleId],
    target: Category,
    candidate: &Part,
) -> bool {
    new_conflicts(rules, baseline, preexisting, target, candidate)
        .next()
        .is_none()
}

/// Compatible options for one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOptions<'a> {
    pub category: Category,
    pub compatible: Vec<&'a Part>,
    pub total: usize,
}

impl CategoryOptions<'_> {
    /// Number of catalog parts hidden by the filter
    pub fn excluded(&self) -> usize {
        self.total - self.compatible.len()
    }
}

/// Run the filter for every category
pub fn available_options<'a>(selection: &Selection, catalog: &'a Catalog) -> Vec<CategoryOptions<'a>> {
    Category::ALL
        .iter()
        .map(|&category| {
            let parts = catalog.parts(category);
            let compatible = filter_options(selection, category, parts);
            debug!(
                category = %category,
                compatible = compatible.len(),
                total = parts.len(),
                "filtered options"
            );
            CategoryOptions {
                category,
                compatible,
                total: parts.len(),
            }
        })
        .collect()
}
