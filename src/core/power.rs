//! Power budget - estimated draw and recommended PSU wattage
//!
//! ```text
//! load        = cpu.power + gpu.power + ram.power + SYSTEM_OVERHEAD_W
//! recommended = ceil(load * 1.3 / PSU_STEP_W) * PSU_STEP_W
//! ```
//!
//! The `power-margin` rule compares a PSU against exactly this number, so
//! both go through [`PowerBudget::for_selection`].

use serde::Serialize;

use crate::core::normalize::normalize;
use crate::core::selection::Selection;
use crate::entities::part::{Category, Part};

/// Allowance for motherboard, storage and fans (watts)
pub const SYSTEM_OVERHEAD_W: f64 = 80.0;

/// Headroom applied to the estimated load, in percent
pub const SAFETY_MARGIN_PERCENT: f64 = 130.0;

/// Recommended wattage is rounded up to a multiple of this
pub const PSU_STEP_W: u32 = 50;

/// Categories whose `power` counts towards the load
pub const LOAD_CATEGORIES: [Category; 3] = [Category::Cpu, Category::Gpu, Category::Ram];

/// Power figures for a selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerBudget {
    /// Sum of selected CPU, GPU and RAM power
    pub component_load_w: f64,
    /// Component load plus system overhead
    pub estimated_load_w: f64,
    /// Estimated load with margin, rounded up to the PSU step
    pub recommended_w: u32,
}

impl PowerBudget {
    pub fn for_selection(selection: &Selection) -> Self {
        let component_load_w: f64 = LOAD_CATEGORIES
            .iter()
            .filter_map(|category| selection.get(*category))
            .map(|part| part.power_w)
            .sum();
        let estimated_load_w = component_load_w + SYSTEM_OVERHEAD_W;

        Self {
            component_load_w,
            estimated_load_w,
            recommended_w: round_up_to_step(estimated_load_w * SAFETY_MARGIN_PERCENT / 100.0),
        }
    }

    /// Whether a PSU of `capacity_w` covers the recommendation
    pub fn is_covered_by(&self, capacity_w: f64) -> bool {
        capacity_w >= f64::from(self.recommended_w)
    }
}

/// Recommended PSU wattage for the selection, whether or not a PSU is chosen
pub fn recommended_psu_watt(selection: &Selection) -> u32 {
    PowerBudget::for_selection(selection).recommended_w
}

/// Round watts up to the next multiple of [`PSU_STEP_W`]
pub fn round_up_to_step(watts: f64) -> u32 {
    let step = f64::from(PSU_STEP_W);
    let steps = (watts.max(0.0) / step).ceil();
    (steps * step) as u32
}

/// PSUs in `catalog` whose capacity meets `watts`, in catalog order
pub fn suitable_psus(catalog: &[Part], watts: u32) -> Vec<&Part> {
    catalog
        .iter()
        .filter(|psu| normalize(psu, Category::Psu).capacity_w >= f64::from(watts))
        .collect()
}
