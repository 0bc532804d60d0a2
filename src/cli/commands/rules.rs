//! `rigcheck rules` - list the declared compatibility rules

use miette::Result;
use serde::Serialize;

use crate::cli::commands::Context;
use crate::cli::helpers::print_document;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::rules::{RuleId, Severity, RULES};
use crate::entities::part::Category;

const RULE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "RULE", 16),
    ColumnDef::new("severity", "SEVERITY", 10),
    ColumnDef::new("requires", "REQUIRES", 14),
    ColumnDef::new("description", "DESCRIPTION", 70),
];

#[derive(Debug, Serialize)]
struct RuleInfo {
    id: RuleId,
    severity: Severity,
    requires: &'static [Category],
    description: &'static str,
    template: &'static str,
}

pub fn run(global: &GlobalOpts) -> Result<()> {
    let ctx = Context::new(global)?;

    let rules: Vec<RuleInfo> = RULES
        .iter()
        .map(|rule| RuleInfo {
            id: rule.id,
            severity: rule.severity,
            requires: rule.requires,
            description: rule.description,
            template: rule.template,
        })
        .collect();

    if print_document(&rules, ctx.format)? {
        return Ok(());
    }

    let rows = rules.iter().map(|rule| {
        TableRow::new(rule.id.as_str())
            .cell("id", CellValue::Text(rule.id.to_string()))
            .cell("severity", CellValue::Severity(rule.severity))
            .cell(
                "requires",
                if rule.requires.is_empty() {
                    CellValue::Text("any".to_string())
                } else {
                    CellValue::Categories(rule.requires.to_vec())
                },
            )
            .cell("description", CellValue::Text(rule.description.to_string()))
    });

    let config = if ctx.quiet {
        TableConfig::for_pipe()
    } else {
        TableConfig::default()
    };
    let format = match ctx.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        other => other,
    };
    TableFormatter::new(RULE_COLUMNS, "rule")
        .with_config(config)
        .output(rows, format);
    Ok(())
}
