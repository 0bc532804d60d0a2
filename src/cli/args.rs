//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    check::CheckArgs, completions::CompletionsArgs, config::ConfigCommands,
    estimate::EstimateCommands, options::OptionsArgs, power::PowerArgs,
};

#[derive(Parser)]
#[command(name = "rigcheck")]
#[command(author, version, about = "PC build compatibility checker")]
#[command(long_about = "Checks a selection of PC parts against compatibility rules, recommends a PSU wattage, narrows catalog options to compatible parts and matches budgets against prebuilt estimates.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Part catalog directory (default: built-in sample catalog)
    #[arg(long, global = true, value_name = "DIR")]
    pub catalog: Option<PathBuf>,

    /// Estimate catalog file (default: built-in sample estimates)
    #[arg(long, global = true, value_name = "FILE")]
    pub estimates: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a build for compatibility problems
    Check(CheckArgs),

    /// Estimate power draw and recommend a PSU
    Power(PowerArgs),

    /// List parts that stay compatible with the current selection
    Options(OptionsArgs),

    /// Look up prebuilt estimates by budget
    #[command(subcommand)]
    Estimate(EstimateCommands),

    /// List the compatibility rules
    Rules,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (report for single results, table for lists)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just model names or rule ids, one per line
    Id,
}
