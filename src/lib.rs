//! rigcheck: PC build compatibility checker
//!
//! Checks a selection of PC parts (CPU, motherboard, RAM, GPU, PSU, case)
//! against declarative compatibility rules, recommends a PSU wattage,
//! narrows catalog options to compatible candidates and matches budgets
//! against prebuilt estimates.

pub mod cli;
pub mod core;
pub mod entities;
pub mod json;
pub mod logging;
