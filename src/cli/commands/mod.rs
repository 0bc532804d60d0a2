//! Command implementations
//!
//! Shared plumbing lives here: resolving the effective configuration,
//! opening catalogs, and turning `--cpu`/`--board`/... flags or a build
//! file into a [`Selection`].

pub mod check;
pub mod completions;
pub mod config;
pub mod estimate;
pub mod options;
pub mod power;
pub mod rules;

use clap::ValueEnum;
use miette::{bail, Result};
use serde_yml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::{Catalog, CatalogLoader};
use crate::core::normalize::normalize;
use crate::core::selection::Selection;
use crate::core::Config;
use crate::entities::part::{Category, Part};

/// Effective settings for one command invocation
pub struct Context {
    pub config: Config,
    pub loader: CatalogLoader,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Layer command-line flags over the loaded configuration
    pub fn new(global: &GlobalOpts) -> Result<Self> {
        let mut config = Config::load();
        config.merge(Config {
            catalog_dir: global.catalog.clone(),
            estimates_file: global.estimates.clone(),
            ..Default::default()
        });

        let format = match (global.format, config.default_format.as_deref()) {
            (OutputFormat::Auto, Some(name)) => parse_format(name)?,
            (format, _) => format,
        };

        debug!(
            catalog = ?config.catalog_dir,
            estimates = ?config.estimates_file,
            ?format,
            "resolved configuration"
        );

        let loader = CatalogLoader::new(config.catalog_dir.clone(), config.estimates_file.clone());
        Ok(Self {
            config,
            loader,
            format,
            quiet: global.quiet,
        })
    }
}

fn parse_format(name: &str) -> Result<OutputFormat> {
    match OutputFormat::from_str(name, true) {
        Ok(format) => Ok(format),
        Err(_) => bail!(
            help = "Use one of: auto, yaml, tsv, json, csv, md, id",
            "Invalid default_format '{}' in configuration",
            name
        ),
    }
}

/// Part selection flags shared by `check`, `power` and `options`
#[derive(clap::Args, Debug, Default, Clone)]
pub struct SelectionArgs {
    /// CPU model
    #[arg(long)]
    pub cpu: Option<String>,

    /// Motherboard model
    #[arg(long, visible_alias = "mobo")]
    pub board: Option<String>,

    /// RAM model
    #[arg(long)]
    pub ram: Option<String>,

    /// GPU model
    #[arg(long)]
    pub gpu: Option<String>,

    /// PSU model
    #[arg(long)]
    pub psu: Option<String>,

    /// Case model
    #[arg(long = "case")]
    pub case: Option<String>,

    /// Build file (YAML or JSON mapping category to model); flags override it
    #[arg(long, value_name = "FILE")]
    pub build: Option<PathBuf>,
}

impl SelectionArgs {
    fn flag(&self, category: Category) -> Option<&str> {
        match category {
            Category::Cpu => self.cpu.as_deref(),
            Category::Board => self.board.as_deref(),
            Category::Ram => self.ram.as_deref(),
            Category::Gpu => self.gpu.as_deref(),
            Category::Psu => self.psu.as_deref(),
            Category::Case => self.case.as_deref(),
        }
    }

    /// Requested model per category, build file first, then flags
    pub fn requested(&self) -> Result<BTreeMap<Category, String>> {
        let mut requested = match &self.build {
            Some(path) => read_build_file(path)?,
            None => BTreeMap::new(),
        };
        for category in Category::ALL {
            if let Some(model) = self.flag(category) {
                requested.insert(category, model.to_string());
            }
        }
        requested.retain(|_, model| !model.trim().is_empty() && !is_none_marker(model));
        Ok(requested)
    }

    /// Resolve the requested models against the catalog
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Result<ResolvedBuild<'a>> {
        let mut parts = Vec::new();
        for (category, model) in self.requested()? {
            parts.push((category, find_part(catalog, category, &model)?));
        }
        Ok(ResolvedBuild::new(parts))
    }
}

/// "none" is how a build file spells an empty slot
fn is_none_marker(model: &str) -> bool {
    model.trim().eq_ignore_ascii_case("none")
}

/// Chosen parts along with the selection they form
pub struct ResolvedBuild<'a> {
    pub parts: Vec<(Category, &'a Part)>,
    pub selection: Selection,
}

impl<'a> ResolvedBuild<'a> {
    pub fn new(parts: Vec<(Category, &'a Part)>) -> Self {
        let selection = Selection::from_parts(parts.iter().map(|(category, part)| (*category, *part)));
        Self { parts, selection }
    }
}

/// Look up a model in a category, failing with a hint when it is unknown
pub fn find_part<'a>(catalog: &'a Catalog, category: Category, model: &str) -> Result<&'a Part> {
    if let Some(part) = catalog.find(category, model) {
        return Ok(part);
    }

    let known = catalog.parts(category);
    let suggestion = known
        .iter()
        .map(Part::model)
        .find(|candidate| candidate.to_lowercase().contains(&model.trim().to_lowercase()));
    let help = match suggestion {
        Some(candidate) => format!("Did you mean '{}'?", candidate),
        None => format!("Run `rigcheck options {} --all` to list known models", category),
    };
    bail!(help = help, "Unknown {} model: '{}'", category.label(), model)
}

/// Parse a build file: a mapping of category name to model
fn read_build_file(path: &Path) -> Result<BTreeMap<Category, String>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read build file {}: {}", path.display(), e))?;
    let value: Value = serde_yml::from_str(&contents)
        .map_err(|e| miette::miette!("Invalid build file {}: {}", path.display(), e))?;

    let Value::Mapping(map) = value else {
        bail!(
            help = "Example:\n  cpu: Ryzen 5 5600\n  board: MAG B550 TOMAHAWK",
            "Build file {} must map categories to models",
            path.display()
        );
    };

    let mut build = BTreeMap::new();
    for (key, model) in map {
        let Some(key) = key.as_str() else {
            bail!("Build file {} has a non-text category key", path.display());
        };
        let category: Category = key.parse().map_err(|e: String| miette::miette!("{}", e))?;
        let model = match model {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => bail!("Build file entry '{}' must be a model name", key),
        };
        build.insert(category, model);
    }
    Ok(build)
}

/// One line per selected part, e.g. "  CPU          Ryzen 5 5600 (AM4, 65W)"
pub fn print_selection(selection: &Selection) {
    use console::style;

    for part in selection.iter() {
        let summary = part.summary();
        if summary.is_empty() {
            println!("  {:<12} {}", style(part.category.label()).dim(), part.model);
        } else {
            println!(
                "  {:<12} {} {}",
                style(part.category.label()).dim(),
                part.model,
                style(format!("({})", summary)).dim()
            );
        }
    }
}

/// Canonical form of every resolved part, for JSON/YAML output
pub fn canonical_parts(parts: &[(Category, &Part)]) -> Vec<crate::core::normalize::CanonicalPart> {
    parts
        .iter()
        .map(|(category, part)| normalize(part, *category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(
            Category::Cpu,
            Catalog::parse_category(r#"[{"model": "Ryzen 5 5600", "socket": "AM4"}]"#, "cpu.json").unwrap(),
        );
        catalog.insert(
            Category::Board,
            Catalog::parse_category(r#"[{"model": "B550", "socket": "AM4"}]"#, "board.json").unwrap(),
        );
        catalog
    }

    #[test]
    fn test_flags_override_build_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("build.yaml");
        fs::write(&path, "cpu: Old CPU\nmobo: B550\ngpu: none\ncase: ~\n").unwrap();

        let args = SelectionArgs {
            cpu: Some("Ryzen 5 5600".to_string()),
            build: Some(path),
            ..Default::default()
        };
        let requested = args.requested().unwrap();
        assert_eq!(requested.len(), 2);
        assert_eq!(requested[&Category::Cpu], "Ryzen 5 5600");
        assert_eq!(requested[&Category::Board], "B550");
    }

    #[test]
    fn test_json_build_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("build.json");
        fs::write(&path, r#"{"cpu": "Ryzen 5 5600", "board": "B550"}"#).unwrap();

        let args = SelectionArgs {
            build: Some(path),
            ..Default::default()
        };
        let catalog = catalog();
        let build = args.resolve(&catalog).unwrap();
        assert_eq!(build.selection.len(), 2);
        assert_eq!(build.parts.len(), 2);
    }

    #[test]
    fn test_build_file_rejects_unknown_category() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("build.yaml");
        fs::write(&path, "cooler: Big Fan\n").unwrap();

        let args = SelectionArgs {
            build: Some(path),
            ..Default::default()
        };
        assert!(args.requested().is_err());
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let catalog = catalog();
        let err = find_part(&catalog, Category::Cpu, "Ryzen 9").unwrap_err();
        assert!(err.to_string().contains("Unknown CPU model"));
        assert!(find_part(&catalog, Category::Cpu, "ryzen 5 5600").is_ok());
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("json").unwrap(), OutputFormat::Json);
        assert_eq!(parse_format("TSV").unwrap(), OutputFormat::Tsv);
        assert!(parse_format("xml").is_err());
    }
}
