//! Catalog record types
//!
//! - [`Part`] - one raw catalog record, field names as found on disk
//! - [`Category`] - the six component slots of a build
//! - [`EstimateEntry`] - a prebuilt configuration with its price

pub mod estimate;
pub mod part;

pub use estimate::{EstimateCatalog, EstimateEntry, EstimatePart};
pub use part::{Category, Part};
