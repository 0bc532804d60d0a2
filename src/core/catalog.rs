//! Catalog loading
//!
//! Part catalogs live in a directory as one JSON array per category
//! (`cpu.json`, `board.json` or `mobo.json`, ...). Estimates live in a
//! single JSON file. When no location is configured, the sample catalog
//! compiled into the binary is used.
//!
//! The loader owns its cache: each catalog is read at most once per
//! [`CatalogLoader`] and then handed out by reference.

use miette::Diagnostic;
use rust_embed::Embed;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::estimate::EstimateCatalog;
use crate::entities::part::{Category, Part};
use crate::json::JsonSyntaxError;

/// Sample data shipped with the binary
#[derive(Embed)]
#[folder = "data/"]
struct BuiltinData;

const BUILTIN_CATALOG_DIR: &str = "compatibility";
const BUILTIN_ESTIMATES: &str = "estimate/estimates.json";

/// Errors raised while loading catalogs
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("Catalog directory not found: {}", .0.display())]
    #[diagnostic(
        code(rigcheck::catalog::not_found),
        help("Pass --catalog <DIR> or set catalog_dir in rigcheck.yaml")
    )]
    DirNotFound(PathBuf),

    #[error("Estimate file not found: {}", .0.display())]
    #[diagnostic(
        code(rigcheck::catalog::estimates_not_found),
        help("Pass --estimates <FILE> or set estimates_file in rigcheck.yaml")
    )]
    EstimatesNotFound(PathBuf),

    #[error("Failed to read {}", path.display())]
    #[diagnostic(code(rigcheck::catalog::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] JsonSyntaxError),

    #[error("{name} must contain a JSON array of parts")]
    #[diagnostic(
        code(rigcheck::catalog::shape),
        help("Wrap the part records in [ ... ]")
    )]
    NotAnArray { name: String },

    #[error("{name} is not a recognised estimate catalog")]
    #[diagnostic(
        code(rigcheck::catalog::estimate_shape),
        help("Expected an array of {{name, totalPrice, parts}} entries or an object mapping use-cases to {{budget, config, note}} entries")
    )]
    EstimateShape { name: String },
}

/// In-memory part lists, one per category
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    parts: BTreeMap<Category, Vec<Part>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, parts: Vec<Part>) {
        self.parts.insert(category, parts);
    }

    /// Parts of a category; empty when the category was not loaded
    pub fn parts(&self, category: Category) -> &[Part] {
        self.parts.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find a part by model: exact match first, then case-insensitive
    pub fn find(&self, category: Category, model: &str) -> Option<&Part> {
        let parts = self.parts(category);
        let wanted = model.trim();
        parts
            .iter()
            .find(|p| p.model() == wanted)
            .or_else(|| parts.iter().find(|p| p.model().eq_ignore_ascii_case(wanted)))
    }

    /// Total number of parts across categories
    pub fn len(&self) -> usize {
        self.parts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse one category file's contents
    pub fn parse_category(source: &str, name: &str) -> Result<Vec<Part>, CatalogError> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| JsonSyntaxError::from_serde_error(&e, source, name))?;

        let Value::Array(items) = value else {
            return Err(CatalogError::NotAnArray {
                name: name.to_string(),
            });
        };

        let total = items.len();
        let parts: Vec<Part> = items.into_iter().filter_map(Part::from_value).collect();
        if parts.len() < total {
            warn!(file = name, skipped = total - parts.len(), "skipped non-object catalog entries");
        }
        Ok(parts)
    }

    /// Load every category from a directory
    ///
    /// A category with no file loads as an empty list.
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        if !dir.is_dir() {
            return Err(CatalogError::DirNotFound(dir.to_path_buf()));
        }

        let mut catalog = Catalog::new();
        for category in Category::ALL {
            let found = category
                .file_stems()
                .iter()
                .map(|stem| dir.join(format!("{}.json", stem)))
                .find(|path| path.is_file());

            let parts = match found {
                Some(path) => {
                    let source = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    Self::parse_category(&source, &path.display().to_string())?
                }
                None => {
                    warn!(category = %category, dir = %dir.display(), "no catalog file for category");
                    Vec::new()
                }
            };
            debug!(category = %category, count = parts.len(), "loaded catalog");
            catalog.insert(category, parts);
        }
        Ok(catalog)
    }

    /// The sample catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new();
        for category in Category::ALL {
            let file = category.file_stems().iter().find_map(|stem| {
                let name = format!("{}/{}.json", BUILTIN_CATALOG_DIR, stem);
                BuiltinData::get(&name).map(|file| (name, file))
            });
            let parts = match file {
                Some((name, file)) => {
                    let source = String::from_utf8_lossy(&file.data);
                    Self::parse_category(&source, &format!("builtin:{}", name))?
                }
                None => Vec::new(),
            };
            catalog.insert(category, parts);
        }
        Ok(catalog)
    }
}

/// Parse an estimate catalog in either accepted shape
pub fn parse_estimates(source: &str, name: &str) -> Result<EstimateCatalog, CatalogError> {
    let value: Value = serde_json::from_str(source)
        .map_err(|e| JsonSyntaxError::from_serde_error(&e, source, name))?;
    serde_json::from_value(value).map_err(|_| CatalogError::EstimateShape {
        name: name.to_string(),
    })
}

/// Loads catalogs on first use and caches them
#[derive(Debug, Default)]
pub struct CatalogLoader {
    catalog_dir: Option<PathBuf>,
    estimates_file: Option<PathBuf>,
    parts: Option<Catalog>,
    estimates: Option<EstimateCatalog>,
}

impl CatalogLoader {
    /// `None` locations fall back to the built-in sample data
    pub fn new(catalog_dir: Option<PathBuf>, estimates_file: Option<PathBuf>) -> Self {
        Self {
            catalog_dir,
            estimates_file,
            parts: None,
            estimates: None,
        }
    }

    /// The part catalog, loading it on first call
    pub fn parts(&mut self) -> Result<&Catalog, CatalogError> {
        if self.parts.is_none() {
            let catalog = match &self.catalog_dir {
                Some(dir) => Catalog::load_dir(dir)?,
                None => Catalog::builtin()?,
            };
            self.parts = Some(catalog);
        }
        Ok(self.parts.get_or_insert_with(Catalog::default))
    }

    /// The estimate catalog, loading it on first call
    pub fn estimates(&mut self) -> Result<&EstimateCatalog, CatalogError> {
        if self.estimates.is_none() {
            let estimates = match &self.estimates_file {
                Some(path) => {
                    if !path.is_file() {
                        return Err(CatalogError::EstimatesNotFound(path.clone()));
                    }
                    let source = fs::read_to_string(path).map_err(|source| CatalogError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    parse_estimates(&source, &path.display().to_string())?
                }
                None => match BuiltinData::get(BUILTIN_ESTIMATES) {
                    Some(file) => parse_estimates(
                        &String::from_utf8_lossy(&file.data),
                        &format!("builtin:{}", BUILTIN_ESTIMATES),
                    )?,
                    None => EstimateCatalog::default(),
                },
            };
            self.estimates = Some(estimates);
        }
        Ok(self.estimates.get_or_insert_with(EstimateCatalog::default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_category() {
        let parts = Catalog::parse_category(r#"[{"model": "A"}, {"model": "B"}]"#, "cpu.json").unwrap();
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_parse_category_skips_non_objects() {
        let parts = Catalog::parse_category(r#"[{"model": "A"}, 12, "x", null]"#, "cpu.json").unwrap();
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_parse_category_rejects_object() {
        let err = Catalog::parse_category(r#"{"model": "A"}"#, "cpu.json").unwrap_err();
        assert!(matches!(err, CatalogError::NotAnArray { .. }));
    }

    #[test]
    fn test_parse_category_syntax_error() {
        let err = Catalog::parse_category("[{\"model\": }]", "gpu.json").unwrap_err();
        match err {
            CatalogError::Syntax(syntax) => assert_eq!(syntax.line(), 1),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_dir_with_aliased_board_file() {
        crate::logging::init_test();
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("cpu.json"), r#"[{"model": "C", "socket": "AM4"}]"#).unwrap();
        fs::write(dir.path().join("mobo.json"), r#"[{"model": "B", "socket": "AM4"}]"#).unwrap();

        let catalog = Catalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.parts(Category::Cpu).len(), 1);
        assert_eq!(catalog.parts(Category::Board).len(), 1);
        assert!(catalog.parts(Category::Gpu).is_empty());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_load_dir_missing() {
        let err = Catalog::load_dir(Path::new("/nonexistent/catalog")).unwrap_err();
        assert!(matches!(err, CatalogError::DirNotFound(_)));
    }

    #[test]
    fn test_find_by_model() {
        let mut catalog = Catalog::new();
        catalog.insert(
            Category::Gpu,
            Catalog::parse_category(r#"[{"model": "RTX 4070"}, {"name": "RX 7800 XT"}]"#, "gpu.json").unwrap(),
        );
        assert!(catalog.find(Category::Gpu, "RTX 4070").is_some());
        assert!(catalog.find(Category::Gpu, "rtx 4070").is_some());
        assert!(catalog.find(Category::Gpu, "RX 7800 XT").is_some());
        assert!(catalog.find(Category::Gpu, "RTX 9090").is_none());
        assert!(catalog.find(Category::Cpu, "RTX 4070").is_none());
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        for category in Category::ALL {
            assert!(!catalog.parts(category).is_empty(), "builtin {} is empty", category);
        }
    }

    #[test]
    fn test_parse_estimates_shapes() {
        let keyed = parse_estimates(r#"{"office": [{"budget": 60}]}"#, "e.json").unwrap();
        assert_eq!(keyed.use_cases(), vec!["office"]);

        let flat = parse_estimates(r#"[{"name": "A", "totalPrice": 10}]"#, "e.json").unwrap();
        assert_eq!(flat.entries(None).len(), 1);

        let err = parse_estimates("42", "e.json").unwrap_err();
        assert!(matches!(err, CatalogError::EstimateShape { .. }));
    }

    #[test]
    fn test_parse_estimates_keeps_file_with_one_bad_entry() {
        let source = r#"[{"name": "ok", "totalPrice": 100}, {"name": "bad", "totalPrice": 200, "parts": "oops"}]"#;
        let estimates = parse_estimates(source, "e.json").unwrap();
        assert_eq!(estimates.entries(None).len(), 2);
    }

    #[test]
    fn test_loader_caches() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("cpu.json"), r#"[{"model": "C"}]"#).unwrap();

        let mut loader = CatalogLoader::new(Some(dir.path().to_path_buf()), None);
        assert_eq!(loader.parts().unwrap().len(), 1);

        // A second call must not re-read the directory
        fs::write(dir.path().join("cpu.json"), "not json").unwrap();
        assert_eq!(loader.parts().unwrap().len(), 1);
    }

    #[test]
    fn test_loader_builtin_estimates() {
        let mut loader = CatalogLoader::default();
        let estimates = loader.estimates().unwrap();
        assert!(!estimates.is_empty());
    }

    #[test]
    fn test_loader_missing_estimates_file() {
        let mut loader = CatalogLoader::new(None, Some(PathBuf::from("/nonexistent/estimates.json")));
        assert!(matches!(
            loader.estimates().unwrap_err(),
            CatalogError::EstimatesNotFound(_)
        ));
    }
}
