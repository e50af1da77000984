//! Validation utilities for the Breastmilk Processing Operations Platform
//!
//! Plausibility checks are advisory: they drive warnings in the run outputs
//! and never block a save. Form checks gate the machine-run wizard steps.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calculations::{try_parse_qty, BagEntry};

// ============================================================================
// Plausibility Flags
// ============================================================================

/// Lightest expected single bag of milk (g)
pub const BAG_WEIGHT_MIN_GRAMS: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Heaviest expected single bag of milk (g)
pub const BAG_WEIGHT_MAX_GRAMS: Decimal = Decimal::from_parts(400, 0, 0, false, 0);

/// Lower bound of typical human milk water content (%)
pub const WATER_CONTENT_MIN_PERCENT: Decimal = Decimal::from_parts(85, 0, 0, false, 0);

/// Upper bound of typical human milk water content (%)
pub const WATER_CONTENT_MAX_PERCENT: Decimal = Decimal::from_parts(895, 0, 0, false, 1);

/// Check whether a bag weight falls outside 30-400 g.
///
/// Blank, unparseable and zero weights are treated as not yet entered.
pub fn is_bag_weight_out_of_range(weight: &str) -> bool {
    match try_parse_qty(weight) {
        Some(grams) if grams > Decimal::ZERO => {
            grams < BAG_WEIGHT_MIN_GRAMS || grams > BAG_WEIGHT_MAX_GRAMS
        }
        _ => false,
    }
}

/// Check whether a water content percentage falls outside 85-89.5%.
///
/// `None`, blank and unparseable text are not flagged.
pub fn is_water_content_out_of_range(percentage: Option<&str>) -> bool {
    percentage
        .and_then(try_parse_qty)
        .map(water_content_outside_band)
        .unwrap_or(false)
}

/// Check a computed water content percentage against the expected band
pub fn water_content_outside_band(percentage: Decimal) -> bool {
    percentage < WATER_CONTENT_MIN_PERCENT || percentage > WATER_CONTENT_MAX_PERCENT
}

// ============================================================================
// Machine Run Wizard
// ============================================================================

/// Validate the identity step: who expressed the milk and when
pub fn validate_run_identity(
    mama_name: &str,
    mama_nric: &str,
    date_expressed: Option<NaiveDate>,
) -> Result<(), &'static str> {
    if mama_name.trim().is_empty() {
        return Err("Mama name is required");
    }
    if mama_nric.trim().is_empty() {
        return Err("Mama NRIC is required");
    }
    if date_expressed.is_none() {
        return Err("Date expressed is required");
    }
    Ok(())
}

/// Validate the individual bags step.
///
/// At least one bag, and every bag needs both a date and a weight.
pub fn validate_individual_bags(bags: &[BagEntry]) -> Result<(), &'static str> {
    if bags.is_empty() {
        return Err("At least one bag is required");
    }
    if bags.iter().any(|bag| bag.date.trim().is_empty()) {
        return Err("Every bag needs a date");
    }
    if bags.iter().any(|bag| bag.weight.trim().is_empty()) {
        return Err("Every bag needs a weight");
    }
    Ok(())
}

/// Parse a bag date (`YYYY-MM-DD`)
pub fn parse_bag_date(date: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| "Bag date must be YYYY-MM-DD")
}
