//! Compatibility rules and the evaluator that runs them
//!
//! Rules are declared once in [`RULES`]. Each rule names the categories
//! it needs, a severity, and a message template whose `{placeholders}`
//! are filled from the parts that violated it. A rule only fires when
//! every category it needs is selected, and a comparison whose data is
//! missing on either side is skipped rather than failed.
//!
//! [`evaluate`] returns a lazy iterator over the findings in declaration
//! order. Nothing short-circuits: every applicable rule runs.

use serde::Serialize;
use std::fmt;

use crate::core::normalize::{format_number, CanonicalPart};
use crate::core::power::{PowerBudget, LOAD_CATEGORIES};
use crate::core::selection::Selection;
use crate::entities::part::Category;

/// Rule identifiers, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    SocketMatch,
    RamTypeMatch,
    FormFactorFit,
    GpuClearance,
    PowerMargin,
    IncompleteData,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::SocketMatch => "socket-match",
            RuleId::RamTypeMatch => "ram-type-match",
            RuleId::FormFactorFit => "form-factor-fit",
            RuleId::GpuClearance => "gpu-clearance",
            RuleId::PowerMargin => "power-margin",
            RuleId::IncompleteData => "incomplete-data",
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RULES
            .iter()
            .map(|rule| rule.id)
            .find(|id| id.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown rule: {}", s))
    }
}

/// How much a failed rule matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory only; the build is still considered compatible
    Info,
    /// Marks the whole selection as incompatible
    Blocking,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Blocking => write!(f, "blocking"),
        }
    }
}

/// One failed rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub rule: RuleId,
    pub severity: Severity,
    pub message: String,
    /// Categories whose parts caused the finding
    pub categories: Vec<Category>,
}

impl Finding {
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }

    pub fn involves(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// Result of running one rule's check
enum Outcome {
    /// A needed category is unselected
    NotApplicable,
    Pass,
    /// Both sides selected but a needed field is empty or zero
    Skipped(Vec<Category>),
    Fail(Violation),
}

struct Violation {
    bindings: Vec<(&'static str, String)>,
    categories: Vec<Category>,
}

impl Violation {
    fn new(categories: Vec<Category>) -> Self {
        Self {
            bindings: Vec::new(),
            categories,
        }
    }

    fn bind(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.bindings.push((key, value.into()));
        self
    }
}

/// A declared compatibility rule
pub struct Rule {
    pub id: RuleId,
    pub severity: Severity,
    /// Categories that must be selected for the rule to fire
    pub requires: &'static [Category],
    pub description: &'static str,
    pub template: &'static str,
    check: Check,
}

/// How a rule decides its outcome
#[derive(Clone, Copy)]
enum Check {
    /// Compares the selected parts
    Parts(fn(&Selection) -> Outcome),
    /// Reports enabled part checks that were skipped for lack of data
    SkippedChecks,
}

impl Rule {
    fn outcome(&self, selection: &Selection, enabled: RuleSet) -> Outcome {
        match self.check {
            Check::Parts(check) => check(selection),
            Check::SkippedChecks => check_incomplete_data(selection, enabled),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("requires", &self.requires)
            .finish()
    }
}

/// All rules, in evaluation order
pub static RULES: &[Rule] = &[
    Rule {
        id: RuleId::SocketMatch,
        severity: Severity::Blocking,
        requires: &[Category::Cpu, Category::Board],
        description: "CPU socket must match the motherboard socket",
        template: "CPU ({cpu}) uses socket {cpu_socket} but motherboard ({board}) has socket {board_socket}",
        check: Check::Parts(check_socket),
    },
    Rule {
        id: RuleId::RamTypeMatch,
        severity: Severity::Blocking,
        requires: &[Category::Board, Category::Ram],
        description: "RAM type must match the motherboard memory type",
        template: "Motherboard ({board}) takes {board_ram} memory but RAM ({ram}) is {ram_type}",
        check: Check::Parts(check_ram_type),
    },
    Rule {
        id: RuleId::FormFactorFit,
        severity: Severity::Blocking,
        requires: &[Category::Case, Category::Board],
        description: "Case must support the motherboard form factor",
        template: "Case ({case}) supports {case_forms} but motherboard ({board}) is {board_form}",
        check: Check::Parts(check_form_factor),
    },
    Rule {
        id: RuleId::GpuClearance,
        severity: Severity::Blocking,
        requires: &[Category::Case, Category::Gpu],
        description: "GPU length must not exceed the case GPU clearance",
        template: "GPU ({gpu}) does not fit in case ({case}): GPU {gpu_length}mm > case {case_max}mm",
        check: Check::Parts(check_gpu_clearance),
    },
    Rule {
        id: RuleId::PowerMargin,
        severity: Severity::Blocking,
        requires: &[Category::Psu],
        description: "PSU capacity must cover the recommended wattage",
        template: "PSU ({psu}) capacity {capacity}W is below the recommended {recommended}W",
        check: Check::Parts(check_power_margin),
    },
    Rule {
        id: RuleId::IncompleteData,
        severity: Severity::Info,
        requires: &[],
        description: "Checks skipped because a part is missing the data they compare",
        template: "Not verified for lack of data: {checks}",
        check: Check::SkippedChecks,
    },
];

/// Look up a declared rule
pub fn rule(id: RuleId) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| rule.id == id)
        .unwrap_or_else(|| unreachable!("every RuleId is declared in RULES"))
}

/// Which rules are enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    disabled: u8,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::all()
    }
}

impl RuleSet {
    pub const fn all() -> Self {
        Self { disabled: 0 }
    }

    /// A copy with `id` switched off
    pub fn without(mut self, id: RuleId) -> Self {
        self.disabled |= id.bit();
        self
    }

    /// A copy with `id` switched on
    pub fn with(mut self, id: RuleId) -> Self {
        self.disabled &= !id.bit();
        self
    }

    pub fn is_enabled(&self, id: RuleId) -> bool {
        self.disabled & id.bit() == 0
    }

    /// Findings for `selection` under the enabled rules
    pub fn evaluate<'a>(&self, selection: &'a Selection) -> Findings<'a> {
        Findings {
            rules: RULES.iter(),
            enabled: *self,
            selection,
        }
    }
}

/// Lazy, restartable (via `Clone`) sequence of findings
#[derive(Clone)]
pub struct Findings<'a> {
    rules: std::slice::Iter<'static, Rule>,
    enabled: RuleSet,
    selection: &'a Selection,
}

impl Iterator for Findings<'_> {
    type Item = Finding;

    fn next(&mut self) -> Option<Finding> {
        for rule in self.rules.by_ref() {
            if !self.enabled.is_enabled(rule.id) {
                continue;
            }
            if let Outcome::Fail(violation) = rule.outcome(self.selection, self.enabled) {
                return Some(Finding {
                    rule: rule.id,
                    severity: rule.severity,
                    message: render(rule.template, &violation.bindings),
                    categories: violation.categories,
                });
            }
        }
        None
    }
}

/// Evaluate every rule against `selection`
pub fn evaluate(selection: &Selection) -> Findings<'_> {
    RuleSet::all().evaluate(selection)
}

/// True when no blocking finding exists
pub fn is_compatible(selection: &Selection) -> bool {
    !evaluate(selection).any(|finding| finding.is_blocking())
}

/// Fill `{key}` placeholders in a template
///
/// One left-to-right pass: substituted values are never rescanned, and
/// unknown placeholders are kept as written.
pub fn render(template: &str, bindings: &[(&str, String)]) -> String {
    let mut message = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        message.push_str(&rest[..open]);
        let key = &rest[open + 1..close];
        match bindings.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => message.push_str(value),
            None => message.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }
    message.push_str(rest);
    message
}

fn pair(
    selection: &Selection,
    a: Category,
    b: Category,
) -> Option<(&CanonicalPart, &CanonicalPart)> {
    Some((selection.get(a)?, selection.get(b)?))
}

fn check_socket(selection: &Selection) -> Outcome {
    let Some((cpu, board)) = pair(selection, Category::Cpu, Category::Board) else {
        return Outcome::NotApplicable;
    };
    if cpu.socket.is_empty() || board.socket.is_empty() {
        return Outcome::Skipped(vec![Category::Cpu, Category::Board]);
    }
    if cpu.socket == board.socket {
        return Outcome::Pass;
    }
    Outcome::Fail(
        Violation::new(vec![Category::Cpu, Category::Board])
            .bind("cpu", &cpu.model)
            .bind("cpu_socket", &cpu.socket)
            .bind("board", &board.model)
            .bind("board_socket", &board.socket),
    )
}

fn check_ram_type(selection: &Selection) -> Outcome {
    let Some((board, ram)) = pair(selection, Category::Board, Category::Ram) else {
        return Outcome::NotApplicable;
    };
    if board.ram_type.is_empty() || ram.ram_type.is_empty() {
        return Outcome::Skipped(vec![Category::Board, Category::Ram]);
    }
    if board.ram_type == ram.ram_type {
        return Outcome::Pass;
    }
    Outcome::Fail(
        Violation::new(vec![Category::Board, Category::Ram])
            .bind("board", &board.model)
            .bind("board_ram", &board.ram_type)
            .bind("ram", &ram.model)
            .bind("ram_type", &ram.ram_type),
    )
}

fn check_form_factor(selection: &Selection) -> Outcome {
    let Some((case, board)) = pair(selection, Category::Case, Category::Board) else {
        return Outcome::NotApplicable;
    };
    if board.form_factor.is_empty() {
        return Outcome::Skipped(vec![Category::Case, Category::Board]);
    }

    let fits = if !case.forms.is_empty() {
        case.forms.contains(&board.form_factor)
    } else if case.form_factor.is_empty() {
        return Outcome::Skipped(vec![Category::Case, Category::Board]);
    } else {
        case.form_factor == board.form_factor
    };
    if fits {
        return Outcome::Pass;
    }

    let supported = if case.forms.is_empty() {
        case.form_factor.clone()
    } else {
        case.forms.join("/")
    };
    Outcome::Fail(
        Violation::new(vec![Category::Case, Category::Board])
            .bind("case", &case.model)
            .bind("case_forms", supported)
            .bind("board", &board.model)
            .bind("board_form", &board.form_factor),
    )
}

fn check_gpu_clearance(selection: &Selection) -> Outcome {
    let Some((case, gpu)) = pair(selection, Category::Case, Category::Gpu) else {
        return Outcome::NotApplicable;
    };
    if gpu.length_mm <= 0.0 || case.gpu_max_length_mm <= 0.0 {
        return Outcome::Skipped(vec![Category::Case, Category::Gpu]);
    }
    if gpu.length_mm <= case.gpu_max_length_mm {
        return Outcome::Pass;
    }
    Outcome::Fail(
        Violation::new(vec![Category::Case, Category::Gpu])
            .bind("gpu", &gpu.model)
            .bind("gpu_length", format_number(gpu.length_mm))
            .bind("case", &case.model)
            .bind("case_max", format_number(case.gpu_max_length_mm)),
    )
}

fn check_power_margin(selection: &Selection) -> Outcome {
    let Some(psu) = selection.get(Category::Psu) else {
        return Outcome::NotApplicable;
    };
    if psu.capacity_w <= 0.0 {
        return Outcome::Skipped(vec![Category::Psu]);
    }

    let budget = PowerBudget::for_selection(selection);
    if budget.is_covered_by(psu.capacity_w) {
        return Outcome::Pass;
    }

    let mut categories = vec![Category::Psu];
    categories.extend(
        LOAD_CATEGORIES
            .iter()
            .copied()
            .filter(|category| selection.is_selected(*category)),
    );
    Outcome::Fail(
        Violation::new(categories)
            .bind("psu", &psu.model)
            .bind("capacity", format_number(psu.capacity_w))
            .bind("recommended", budget.recommended_w.to_string()),
    )
}

fn check_incomplete_data(selection: &Selection, enabled: RuleSet) -> Outcome {
    let mut checks = Vec::new();
    let mut categories: Vec<Category> = Vec::new();

    for rule in RULES.iter().filter(|rule| enabled.is_enabled(rule.id)) {
        let Check::Parts(check) = rule.check else {
            continue;
        };
        if let Outcome::Skipped(involved) = check(selection) {
            checks.push(rule.id.as_str());
            for category in involved {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }
    }

    if checks.is_empty() {
        return Outcome::NotApplicable;
    }
    Outcome::Fail(Violation::new(categories).bind("checks", checks.join(", ")))
}
