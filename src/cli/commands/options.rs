//! `rigcheck options` - catalog parts that stay compatible with a selection

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::commands::{print_selection, Context, SelectionArgs};
use crate::cli::helpers::print_document;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::filter::{available_options, candidate_conflicts, filter_options};
use crate::core::normalize::{normalize, CanonicalPart};
use crate::entities::part::Category;

#[derive(clap::Args, Debug)]
pub struct OptionsArgs {
    /// Category to list (omit for a per-category summary)
    pub category: Option<Category>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Also list excluded parts, with the reason
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Wrap long text columns at this width
    #[arg(long, value_name = "WIDTH")]
    pub wrap: Option<usize>,
}

const PART_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("model", "MODEL", 36),
    ColumnDef::new("details", "DETAILS", 36),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("reason", "REASON", 80),
];

const SUMMARY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("category", "CATEGORY", 10),
    ColumnDef::new("compatible", "COMPATIBLE", 12),
    ColumnDef::new("total", "TOTAL", 8),
    ColumnDef::new("selected", "SELECTED", 40),
];

#[derive(Debug, Serialize)]
struct OptionEntry {
    #[serde(flatten)]
    part: CanonicalPart,
    compatible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conflicts: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CategorySummary {
    category: Category,
    compatible: usize,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected: Option<String>,
}

pub fn run(args: OptionsArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::new(global)?;
    let catalog = ctx.loader.parts()?;
    let build = args.selection.resolve(catalog)?;

    let config = match (ctx.quiet, args.wrap) {
        (true, _) => TableConfig::for_pipe(),
        (false, Some(width)) => TableConfig::with_wrap(width),
        (false, None) => TableConfig::default(),
    };

    let Some(target) = args.category else {
        let summaries: Vec<CategorySummary> = available_options(&build.selection, catalog)
            .into_iter()
            .map(|options| CategorySummary {
                category: options.category,
                compatible: options.compatible.len(),
                total: options.total,
                selected: build
                    .selection
                    .get(options.category)
                    .map(|part| part.model.clone()),
            })
            .collect();
        if print_document(&summaries, ctx.format)? {
            return Ok(());
        }

        let rows = summaries.iter().map(|s| {
            TableRow::new(s.category.as_str())
                .cell("category", CellValue::Category(s.category))
                .cell("compatible", CellValue::Number(s.compatible as i64))
                .cell("total", CellValue::Number(s.total as i64))
                .cell(
                    "selected",
                    s.selected
                        .clone()
                        .map(CellValue::Text)
                        .unwrap_or(CellValue::Empty),
                )
        });
        TableFormatter::new(SUMMARY_COLUMNS, "category")
            .with_config(config)
            .output(rows, table_format(ctx.format));
        return Ok(());
    };

    let parts = catalog.parts(target);
    let entries: Vec<OptionEntry> = if args.all {
        parts
            .iter()
            .map(|part| {
                let conflicts: Vec<String> = candidate_conflicts(&build.selection, target, part)
                    .into_iter()
                    .map(|finding| finding.message)
                    .collect();
                OptionEntry {
                    part: normalize(part, target),
                    compatible: conflicts.is_empty(),
                    conflicts,
                }
            })
            .collect()
    } else {
        filter_options(&build.selection, target, parts)
            .into_iter()
            .map(|part| OptionEntry {
                part: normalize(part, target),
                compatible: true,
                conflicts: Vec::new(),
            })
            .collect()
    };

    if print_document(&entries, ctx.format)? {
        return Ok(());
    }

    if ctx.format == OutputFormat::Auto && !ctx.quiet && !build.selection.is_empty() {
        println!("{}", style("Given").bold());
        print_selection(&build.selection);
        println!();
    }

    let rows = entries.iter().map(|entry| {
        let mut row = TableRow::new(entry.part.model.clone())
            .cell("model", CellValue::Text(entry.part.model.clone()))
            .cell("details", CellValue::Text(entry.part.summary()));
        if args.all {
            let status = if entry.compatible { "ok" } else { "conflict" };
            row = row
                .cell("status", CellValue::Verdict(status.to_string()))
                .cell(
                    "reason",
                    match entry.conflicts.first() {
                        Some(message) => CellValue::Text(message.clone()),
                        None => CellValue::Empty,
                    },
                );
        }
        row
    });

    let columns = if args.all { PART_COLUMNS } else { &PART_COLUMNS[..2] };
    TableFormatter::new(columns, target.as_str())
        .with_config(config)
        .output(rows, table_format(ctx.format));

    if ctx.format == OutputFormat::Auto && !ctx.quiet && !args.all {
        let hidden = parts.len() - entries.len();
        if hidden > 0 {
            println!(
                "{} {} incompatible {}(s) hidden. Use --all to show them.",
                style("•").dim(),
                hidden,
                target
            );
        }
    }
    Ok(())
}

fn table_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => OutputFormat::Tsv,
        other => other,
    }
}
