//! `rigcheck config` command - view the effective configuration

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::Path;

use crate::cli::commands::Context;
use crate::cli::helpers::print_document;
use crate::cli::GlobalOpts;
use crate::core::config::{Config, ENV_CATALOG, ENV_ESTIMATES, ENV_FORMAT, LOCAL_CONFIG_FILE};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("catalog_dir", "Directory of per-category part catalogs (cpu.json, ...)"),
    ("estimates_file", "Estimate catalog file"),
    ("default_format", "Default output format (yaml, json, tsv, etc.)"),
    ("default_use_case", "Use-case tag for `estimate` when --use-case is omitted"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::new(global)?;
    let config = &ctx.config;

    if let Some(key) = &args.key {
        if !VALID_KEYS.iter().any(|(valid, _)| *valid == key.as_str()) {
            return Err(miette::miette!(
                help = "Run `rigcheck config keys` to list the keys",
                "Unknown configuration key '{}'",
                key
            ));
        }
        match get_config_value(config, key) {
            Some(value) => println!("{}", value),
            None => return Err(miette::miette!("Key '{}' is not set", key)),
        }
        return Ok(());
    }

    if print_document(config, ctx.format)? {
        return Ok(());
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        print_config_value(key, get_config_value(config, key).as_deref());
    }

    if !ctx.quiet {
        println!();
        println!("{}", style("Config Sources (in priority order):").dim());
        println!("  1. Command-line flags (--catalog, --estimates, --format)");
        println!(
            "  2. Environment variables ({}, {}, {})",
            ENV_CATALOG, ENV_ESTIMATES, ENV_FORMAT
        );
        println!("  3. Working directory config (./{})", LOCAL_CONFIG_FILE);
        println!("  4. Global config (~/.config/rigcheck/config.yaml)");
        if config.catalog_dir.is_none() {
            println!();
            println!("{}", style("No catalog_dir set: using the built-in sample catalog.").dim());
        }
    }
    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();
    match Config::global_config_path() {
        Some(path) => print_path("Global:", &path),
        None => println!(
            "  {} {}",
            style("Global:").cyan(),
            style("(no config directory on this platform)").dim()
        ),
    }
    print_path("Local:", Path::new(LOCAL_CONFIG_FILE));
    Ok(())
}

fn print_path(label: &str, path: &Path) {
    let state = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("  {:<8} {} {}", style(label).cyan(), path.display(), state);
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }
    println!();
    println!(
        "{}",
        style(format!("Set them in ./{} or the global config file.", LOCAL_CONFIG_FILE)).dim()
    );
    Ok(())
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "catalog_dir" => config.catalog_dir.as_ref().map(|p| p.display().to_string()),
        "estimates_file" => config.estimates_file.as_ref().map(|p| p.display().to_string()),
        "default_format" => config.default_format.clone(),
        "default_use_case" => config.default_use_case.clone(),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_get_config_value() {
        let config = Config {
            catalog_dir: Some(PathBuf::from("parts")),
            default_use_case: Some("gaming".to_string()),
            ..Default::default()
        };
        assert_eq!(get_config_value(&config, "catalog_dir").as_deref(), Some("parts"));
        assert_eq!(get_config_value(&config, "default_use_case").as_deref(), Some("gaming"));
        assert!(get_config_value(&config, "estimates_file").is_none());
        assert!(get_config_value(&config, "bogus").is_none());
    }

    #[test]
    fn test_every_valid_key_is_readable() {
        let config = Config {
            catalog_dir: Some(PathBuf::from("a")),
            estimates_file: Some(PathBuf::from("b")),
            default_format: Some("json".to_string()),
            default_use_case: Some("office".to_string()),
        };
        for (key, _) in VALID_KEYS {
            assert!(get_config_value(&config, key).is_some(), "{} unreadable", key);
        }
    }
}
