//! # vtkey Configuration Module
//!
//! This module centralizes the format and tuning constants for vtkey.
//! Constants are grouped by their functional area and interdependencies are
//! documented and enforced through compile-time assertions.
//!
//! ## Why Centralization?
//!
//! The header sentinels, the integer selector ranges and the `VA_MIN`
//! singleton all carve up the same 256 values of a single byte. Keeping them
//! side by side, with assertions that the ranges neither overlap nor leave
//! holes, is what keeps byte order equal to value order.
//!
//! ## Module Organization
//!
//! - [`constants`]: All numeric configuration values with dependency documentation

pub mod constants;
pub use constants::*;
