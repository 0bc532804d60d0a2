//! `rigcheck estimate` - prebuilt estimates by budget

use clap::Subcommand;
use console::style;
use miette::{bail, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::check::{finding_row, print_findings, FINDING_COLUMNS};
use crate::cli::commands::{Context, ResolvedBuild};
use crate::cli::helpers::print_document;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::Catalog;
use crate::core::estimate::{filter_by_range, find_closest};
use crate::core::normalize::format_number;
use crate::core::rules::{evaluate, Finding};
use crate::entities::estimate::{EstimateCatalog, EstimateEntry};
use crate::entities::part::{Category, Part};

#[derive(Subcommand, Debug)]
pub enum EstimateCommands {
    /// Show the estimate whose price is closest to a budget
    Closest(ClosestArgs),

    /// List estimates priced within a range
    Range(RangeArgs),
}

#[derive(clap::Args, Debug)]
pub struct ClosestArgs {
    /// Target budget
    #[arg(long, short = 'b')]
    pub budget: f64,

    /// Use-case tag (e.g. office, gaming)
    #[arg(long, short = 'u')]
    pub use_case: Option<String>,

    /// Also check the estimate's parts against the compatibility rules
    #[arg(long)]
    pub check: bool,
}

#[derive(clap::Args, Debug)]
pub struct RangeArgs {
    /// Lowest price (inclusive)
    #[arg(long)]
    pub min: f64,

    /// Highest price (inclusive)
    #[arg(long)]
    pub max: f64,

    /// Use-case tag (e.g. office, gaming)
    #[arg(long, short = 'u')]
    pub use_case: Option<String>,
}

const ESTIMATE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("title", "TITLE", 40),
    ColumnDef::new("price", "PRICE", 10),
    ColumnDef::new("parts", "PARTS", 7),
    ColumnDef::new("note", "NOTE", 50),
];

#[derive(Debug, Serialize)]
struct ClosestReport<'a> {
    #[serde(flatten)]
    entry: &'a EstimateEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<EstimateCheck>,
}

/// Outcome of checking an estimate's parts against the catalog and rules
#[derive(Debug, Serialize)]
struct EstimateCheck {
    compatible: bool,
    /// Parts named by the estimate that the catalog does not know
    unresolved: Vec<String>,
    findings: Vec<Finding>,
}

/// Run an estimate subcommand
pub fn run(cmd: EstimateCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EstimateCommands::Closest(args) => run_closest(args, global),
        EstimateCommands::Range(args) => run_range(args, global),
    }
}

fn run_closest(args: ClosestArgs, global: &GlobalOpts) -> Result<()> {
    validate_amount("budget", args.budget, false)?;

    let mut ctx = Context::new(global)?;
    let use_case = args.use_case.or_else(|| ctx.config.default_use_case.clone());
    let estimates = ctx.loader.estimates()?.clone();
    let entries = estimates.entries(use_case.as_deref());

    let Some(entry) = find_closest(entries.iter().copied(), args.budget) else {
        report_empty(&estimates, use_case.as_deref(), ctx.quiet);
        return Ok(());
    };

    let check = if args.check {
        Some(check_entry(entry, ctx.loader.parts()?))
    } else {
        None
    };

    let report = ClosestReport { entry, check };
    if print_document(&report, ctx.format)? {
        return Ok(());
    }

    match ctx.format {
        OutputFormat::Auto => {
            print_card(entry, args.budget);
            if let Some(check) = &report.check {
                println!();
                print_check(check);
            }
        }
        OutputFormat::Id => println!("{}", entry.title()),
        format => {
            let rows = report
                .check
                .iter()
                .flat_map(|check| check.findings.iter())
                .map(finding_row);
            if args.check {
                TableFormatter::new(FINDING_COLUMNS, "finding")
                    .with_config(TableConfig::for_pipe())
                    .output(rows, format);
            } else {
                TableFormatter::new(ESTIMATE_COLUMNS, "estimate")
                    .with_config(TableConfig::for_pipe())
                    .output([estimate_row(entry)], format);
            }
        }
    }
    Ok(())
}

fn run_range(args: RangeArgs, global: &GlobalOpts) -> Result<()> {
    validate_amount("min", args.min, true)?;
    validate_amount("max", args.max, true)?;

    let mut ctx = Context::new(global)?;
    let use_case = args.use_case.or_else(|| ctx.config.default_use_case.clone());
    let estimates = ctx.loader.estimates()?;
    let entries = estimates.entries(use_case.as_deref());
    let hits = filter_by_range(entries.iter().copied(), args.min, args.max);

    if print_document(&hits, ctx.format)? {
        return Ok(());
    }

    if hits.is_empty() && ctx.format == OutputFormat::Auto {
        if entries.is_empty() {
            report_empty(estimates, use_case.as_deref(), ctx.quiet);
        } else if !ctx.quiet {
            println!(
                "{} No estimates priced between {} and {}",
                style("•").dim(),
                format_number(args.min),
                format_number(args.max)
            );
        }
        return Ok(());
    }

    let config = if ctx.quiet {
        TableConfig::for_pipe()
    } else {
        TableConfig::default()
    };
    let format = match ctx.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        other => other,
    };
    TableFormatter::new(ESTIMATE_COLUMNS, "estimate")
        .with_config(config)
        .output(hits.into_iter().map(estimate_row), format);
    Ok(())
}

fn validate_amount(name: &str, value: f64, allow_zero: bool) -> Result<()> {
    let valid = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if !valid {
        let expected = if allow_zero { "zero or more" } else { "greater than zero" };
        bail!(
            help = "Amounts are plain numbers, e.g. --budget 1200",
            "Invalid {}: {} (must be {})",
            name,
            value,
            expected
        );
    }
    Ok(())
}

fn report_empty(estimates: &EstimateCatalog, use_case: Option<&str>, quiet: bool) {
    if quiet {
        return;
    }
    match use_case {
        Some(tag) if !estimates.use_cases().is_empty() => println!(
            "{} No estimates for use-case '{}'. Available: {}",
            style("•").dim(),
            tag,
            estimates.use_cases().join(", ")
        ),
        _ => println!("{} No estimates available", style("•").dim()),
    }
}

fn estimate_row(entry: &EstimateEntry) -> TableRow {
    TableRow::new(entry.title())
        .cell("title", CellValue::Text(entry.title().to_string()))
        .cell("price", CellValue::Text(format_number(entry.price)))
        .cell("parts", CellValue::Number(entry.parts.len() as i64))
        .cell(
            "note",
            match (&entry.name, &entry.note) {
                (Some(_), Some(note)) => CellValue::Text(note.clone()),
                _ => CellValue::Empty,
            },
        )
}

/// Resolve an estimate's parts and evaluate the resulting build
fn check_entry(entry: &EstimateEntry, catalog: &Catalog) -> EstimateCheck {
    let mut parts: Vec<(Category, &Part)> = Vec::new();
    let mut unresolved = Vec::new();

    for item in &entry.parts {
        // Categories outside the rule set (storage, cooler, ...) are not checked
        let Ok(category) = item.category.parse::<Category>() else {
            continue;
        };
        match catalog.find(category, &item.name) {
            Some(part) => parts.push((category, part)),
            None => unresolved.push(format!("{}: {}", category, item.name)),
        }
    }

    let build = ResolvedBuild::new(parts);
    let findings: Vec<Finding> = evaluate(&build.selection).collect();
    EstimateCheck {
        compatible: !findings.iter().any(Finding::is_blocking),
        unresolved,
        findings,
    }
}

fn print_card(entry: &EstimateEntry, budget: f64) {
    println!("{}", style(entry.title()).bold());
    let difference = entry.price - budget;
    let delta = if difference == 0.0 {
        "on budget".to_string()
    } else if difference > 0.0 {
        format!("{} over budget", format_number(difference))
    } else {
        format!("{} under budget", format_number(-difference))
    };
    println!(
        "{} {} {}",
        style("Price:").dim(),
        style(format_number(entry.price)).cyan(),
        style(format!("({})", delta)).dim()
    );
    if let (Some(_), Some(note)) = (&entry.name, &entry.note) {
        println!("{} {}", style("Note:").dim(), note);
    }

    if entry.parts.is_empty() {
        return;
    }
    println!();
    let mut table = Builder::default();
    table.push_record(["Category", "Part"]);
    for part in &entry.parts {
        table.push_record([part.category.as_str(), part.name.as_str()]);
    }
    println!("{}", table.build().with(Style::rounded()));
}

fn print_check(check: &EstimateCheck) {
    for missing in &check.unresolved {
        println!("{} Not in catalog, not checked: {}", style("?").yellow(), missing);
    }
    print_findings(&check.findings);
    if check.compatible {
        println!("{} Compatible", style("✓").green().bold());
    } else {
        let blocking = check.findings.iter().filter(|f| f.is_blocking()).count();
        println!("{} {} blocking problem(s)", style("✗").red().bold(), blocking);
    }
}
