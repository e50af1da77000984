//! Cross-check reconciliation tests
//!
//! Declared powder weight against the sum of independently weighed packages.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    compute_cross_check, compute_cross_check_with_tolerance, compute_run_summary, row_total,
    BagEntry, CrossCheckEntry, RunInputs, CROSS_CHECK_TOLERANCE_PERCENT,
};
use std::str::FromStr;

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn entry(powder_weight: &str, quantity: &str) -> CrossCheckEntry {
    CrossCheckEntry::new(format!("{}x{}", powder_weight, quantity), powder_weight, quantity)
}

// ============================================================================
// Tolerance band
// ============================================================================

#[test]
fn test_five_percent_over_is_within() {
    let result = compute_cross_check(&[entry("105", "1")], dec("100"));

    assert_eq!(result.variance_pct, dec("5.00"));
    assert!(result.is_within_tolerance);
}

#[test]
fn test_just_over_five_percent_is_outside() {
    let result = compute_cross_check(&[entry("105.01", "1")], dec("100"));

    assert_eq!(result.variance_pct, dec("5.01"));
    assert!(!result.is_within_tolerance);
}

#[test]
fn test_verdict_uses_unrounded_variance() {
    // 5.004% displays as 5.00 but is still outside the band
    let result = compute_cross_check(&[entry("105.004", "1")], dec("100"));

    assert_eq!(result.variance_pct.to_string(), "5.00");
    assert!(!result.is_within_tolerance);
}

#[test]
fn test_short_batch_is_flagged() {
    let result = compute_cross_check(&[entry("10", "5"), entry("8", "3")], dec("90"));

    assert_eq!(result.row_totals, vec![dec("50"), dec("24")]);
    assert_eq!(result.combined_total.to_string(), "74.00");
    assert_eq!(result.difference.to_string(), "-16.00");
    assert_eq!(result.variance_pct, dec("-17.78"));
    assert!(!result.is_within_tolerance);
}

#[test]
fn test_nothing_declared_is_within() {
    let result = compute_cross_check(&[entry("10", "5")], Decimal::ZERO);

    assert_eq!(result.variance_pct, Decimal::ZERO);
    assert!(result.is_within_tolerance);
}

#[test]
fn test_custom_tolerance() {
    let entries = [entry("103", "1")];

    assert!(compute_cross_check_with_tolerance(&entries, dec("100"), dec("5")).is_within_tolerance);
    assert!(!compute_cross_check_with_tolerance(&entries, dec("100"), dec("2.5")).is_within_tolerance);
}

#[test]
fn test_blank_rows_contribute_nothing() {
    assert_eq!(row_total(&entry("", "4")), Decimal::ZERO);
    assert_eq!(row_total(&entry("12.5", "")), Decimal::ZERO);
    assert_eq!(row_total(&entry("12.5", "4")), dec("50.00"));
}

// ============================================================================
// Run summary
// ============================================================================

#[test]
fn test_summary_reconciles_against_declared_powder() {
    let inputs = RunInputs {
        bags_weight: "50".to_string(),
        powder_weight: "60".to_string(),
        bags: vec![
            BagEntry::new("a", "2024-03-01", "500"),
            BagEntry::new("b", "2024-03-01", "300"),
        ],
        ..Default::default()
    };
    let checks = [entry("10", "6")];

    let summary = compute_run_summary(&inputs, &checks, CROSS_CHECK_TOLERANCE_PERCENT);

    assert_eq!(summary.cross_check.expected_weight, dec("60"));
    assert!(summary.cross_check.is_within_tolerance);
    // 92% water content and a 500 g bag both warrant a second look
    assert!(summary.water_content_out_of_range);
    assert_eq!(summary.out_of_range_bag_ids, vec!["a".to_string()]);
    assert!(summary.has_warnings());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Over and under by the same amount get the same verdict
    #[test]
    fn tolerance_is_symmetric(
        expected in 1u32..100_000,
        offset_hundredths in 0u32..2_000,
    ) {
        let expected = Decimal::from(expected);
        let offset = expected * Decimal::new(offset_hundredths as i64, 2) / Decimal::ONE_HUNDRED;

        let over = compute_cross_check(&[entry(&(expected + offset).to_string(), "1")], expected);
        let under = compute_cross_check(&[entry(&(expected - offset).to_string(), "1")], expected);

        prop_assert_eq!(over.is_within_tolerance, under.is_within_tolerance);
        prop_assert_eq!(over.variance_pct, -under.variance_pct);
    }

    /// Combined total is the sum of the rows
    #[test]
    fn combined_total_sums_rows(
        rows in prop::collection::vec((1u32..1000, 1u32..50), 0..10),
    ) {
        let entries: Vec<_> = rows
            .iter()
            .map(|(w, q)| entry(&w.to_string(), &q.to_string()))
            .collect();
        let result = compute_cross_check(&entries, Decimal::from(500));

        let expected: u32 = rows.iter().map(|(w, q)| w * q).sum();
        prop_assert_eq!(result.combined_total, Decimal::from(expected));
    }
}
