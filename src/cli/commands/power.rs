//! `rigcheck power` - power budget and PSU recommendation

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::commands::{Context, SelectionArgs};
use crate::cli::helpers::{format_watts, print_document};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::normalize::{normalize, CanonicalPart};
use crate::core::power::{suitable_psus, PowerBudget, SYSTEM_OVERHEAD_W};
use crate::entities::part::{Category, Part};

#[derive(clap::Args, Debug)]
pub struct PowerArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Only compute the budget; do not list suitable PSUs
    #[arg(long)]
    pub no_suggest: bool,
}

const PSU_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("model", "MODEL", 40),
    ColumnDef::new("capacity", "CAPACITY", 10),
    ColumnDef::new("headroom", "HEADROOM", 10),
];

#[derive(Debug, Serialize)]
struct PowerReport {
    #[serde(flatten)]
    budget: PowerBudget,
    #[serde(skip_serializing_if = "Option::is_none")]
    psu: Option<SelectedPsu>,
    suitable_psus: Vec<CanonicalPart>,
}

#[derive(Debug, Serialize)]
struct SelectedPsu {
    model: String,
    capacity_w: f64,
    sufficient: bool,
}

pub fn run(args: PowerArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::new(global)?;
    let catalog = ctx.loader.parts()?;
    let build = args.selection.resolve(catalog)?;

    let budget = PowerBudget::for_selection(&build.selection);
    let psu = build.selection.get(Category::Psu).map(|psu| SelectedPsu {
        model: psu.model.clone(),
        capacity_w: psu.capacity_w,
        sufficient: psu.capacity_w > 0.0 && budget.is_covered_by(psu.capacity_w),
    });
    let suitable: Vec<&Part> = if args.no_suggest {
        Vec::new()
    } else {
        suitable_psus(catalog.parts(Category::Psu), budget.recommended_w)
    };

    let report = PowerReport {
        budget,
        psu,
        suitable_psus: suitable.iter().map(|p| normalize(p, Category::Psu)).collect(),
    };
    if print_document(&report, ctx.format)? {
        return Ok(());
    }

    let rows = report.suitable_psus.iter().map(|psu| {
        TableRow::new(psu.model.clone())
            .cell("model", CellValue::Text(psu.model.clone()))
            .cell("capacity", CellValue::Watts(psu.capacity_w))
            .cell(
                "headroom",
                CellValue::Watts(psu.capacity_w - f64::from(report.budget.recommended_w)),
            )
    });

    match ctx.format {
        OutputFormat::Auto => {
            if ctx.quiet {
                println!("{}", report.budget.recommended_w);
                return Ok(());
            }
            print_budget(&report);
            if !args.no_suggest {
                println!();
                if report.suitable_psus.is_empty() {
                    println!(
                        "{} No PSU in the catalog reaches {}W",
                        style("!").yellow(),
                        report.budget.recommended_w
                    );
                } else {
                    println!("{}", style("Suitable PSUs").bold());
                    TableFormatter::new(PSU_COLUMNS, "PSU").output(rows, OutputFormat::Tsv);
                }
            }
        }
        format => {
            let config = if ctx.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            TableFormatter::new(PSU_COLUMNS, "PSU")
                .with_config(config)
                .output(rows, format);
        }
    }
    Ok(())
}

fn print_budget(report: &PowerReport) {
    let budget = &report.budget;
    println!(
        "{:<17} {}",
        style("Component load:").dim(),
        format_watts(budget.component_load_w)
    );
    println!(
        "{:<17} {} {}",
        style("Estimated load:").dim(),
        format_watts(budget.estimated_load_w),
        style(format!("(incl. {} system overhead)", format_watts(SYSTEM_OVERHEAD_W))).dim()
    );
    println!(
        "{:<17} {}",
        style("Recommended PSU:").dim(),
        style(format!("{}W", budget.recommended_w)).cyan().bold()
    );

    if let Some(psu) = &report.psu {
        let verdict = if psu.capacity_w <= 0.0 {
            style("capacity unknown".to_string()).yellow()
        } else if psu.sufficient {
            style("✓ sufficient".to_string()).green()
        } else {
            style("✗ too small".to_string()).red().bold()
        };
        println!(
            "{:<17} {} ({}) {}",
            style("Selected PSU:").dim(),
            psu.model,
            format_watts(psu.capacity_w),
            verdict
        );
    }
}
