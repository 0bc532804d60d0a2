//! `rigcheck check` - evaluate a build against the compatibility rules

use console::style;
use miette::{bail, Result};
use serde::Serialize;

use crate::cli::commands::{canonical_parts, print_selection, Context, SelectionArgs};
use crate::cli::helpers::print_document;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::normalize::CanonicalPart;
use crate::core::power::PowerBudget;
use crate::core::rules::{Finding, RuleId, RuleSet, Severity};
use crate::core::selection::Selection;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Exit with an error when the build has blocking problems
    #[arg(long)]
    pub strict: bool,

    /// Skip a rule (repeatable)
    #[arg(long = "skip-rule", value_name = "RULE")]
    pub skip_rules: Vec<RuleId>,
}

/// Column definitions for findings
pub const FINDING_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("rule", "RULE", 16),
    ColumnDef::new("severity", "SEVERITY", 10),
    ColumnDef::new("categories", "PARTS", 18),
    ColumnDef::new("message", "MESSAGE", 90),
];

/// Machine-readable result of a check
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub compatible: bool,
    pub parts: Vec<CanonicalPart>,
    pub power: PowerBudget,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn new(rules: RuleSet, selection: &Selection, parts: Vec<CanonicalPart>) -> Self {
        let findings: Vec<Finding> = rules.evaluate(selection).collect();
        Self {
            compatible: !findings.iter().any(Finding::is_blocking),
            parts,
            power: PowerBudget::for_selection(selection),
            findings,
        }
    }

    pub fn blocking(&self) -> usize {
        self.findings.iter().filter(|f| f.is_blocking()).count()
    }
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::new(global)?;
    let catalog = ctx.loader.parts()?;
    let build = args.selection.resolve(catalog)?;

    let rules = args
        .skip_rules
        .iter()
        .fold(RuleSet::all(), |rules, id| rules.without(*id));
    let report = CheckReport::new(rules, &build.selection, canonical_parts(&build.parts));

    if !print_document(&report, ctx.format)? {
        match ctx.format {
            OutputFormat::Auto => print_report(&report, &build.selection, ctx.quiet),
            format => {
                let config = if ctx.quiet {
                    TableConfig::for_pipe()
                } else {
                    TableConfig::default()
                };
                TableFormatter::new(FINDING_COLUMNS, "finding")
                    .with_config(config)
                    .output(report.findings.iter().map(finding_row), format);
            }
        }
    }

    if args.strict && !report.compatible {
        bail!("{} blocking compatibility problem(s) found", report.blocking());
    }
    Ok(())
}

pub fn finding_row(finding: &Finding) -> TableRow {
    TableRow::new(finding.rule.as_str())
        .cell("rule", CellValue::Text(finding.rule.to_string()))
        .cell("severity", CellValue::Severity(finding.severity))
        .cell("categories", CellValue::Categories(finding.categories.clone()))
        .cell("message", CellValue::Text(finding.message.clone()))
}

/// Human-readable findings list, one line each
pub fn print_findings(findings: &[Finding]) {
    for finding in findings {
        let marker = match finding.severity {
            Severity::Blocking => style("✗").red().bold(),
            Severity::Info => style("!").yellow(),
        };
        println!(
            "{} {} {}",
            marker,
            finding.message,
            style(format!("[{}]", finding.rule)).dim()
        );
    }
}

fn print_report(report: &CheckReport, selection: &Selection, quiet: bool) {
    if quiet {
        print_findings(&report.findings);
        return;
    }

    if selection.is_empty() {
        println!(
            "{} No parts selected. Use --cpu, --board, --ram, --gpu, --psu, --case or --build.",
            style("•").dim()
        );
        return;
    }

    println!("{}", style("Build").bold());
    print_selection(selection);
    println!();

    print_findings(&report.findings);
    if !report.findings.is_empty() {
        println!();
    }

    println!(
        "{} {}W (estimated load {}W)",
        style("Recommended PSU:").dim(),
        style(report.power.recommended_w).cyan(),
        crate::core::normalize::format_number(report.power.estimated_load_w)
    );

    if report.compatible {
        println!("{} Compatible", style("✓").green().bold());
    } else {
        println!(
            "{} {} blocking problem(s)",
            style("✗").red().bold(),
            report.blocking()
        );
    }
}
