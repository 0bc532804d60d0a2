//! Core module - the compatibility engine and its collaborators
//!
//! The engine ([`normalize`], [`rules`], [`power`], [`filter`],
//! [`estimate`]) is pure: it takes selections and part slices and never
//! touches the filesystem. [`catalog`] and [`config`] do the I/O.

pub mod catalog;
pub mod config;
pub mod estimate;
pub mod filter;
pub mod normalize;
pub mod power;
pub mod rules;
pub mod selection;

pub use catalog::{Catalog, CatalogError, CatalogLoader};
pub use config::{Config, ConfigError};
pub use estimate::{filter_by_range, find_closest};
pub use filter::{available_options, candidate_conflicts, filter_options, CategoryOptions};
pub use normalize::{normalize, CanonicalPart};
pub use power::{recommended_psu_watt, suitable_psus, PowerBudget};
pub use rules::{evaluate, is_compatible, Finding, RuleId, RuleSet, Severity};
pub use selection::Selection;
