//! Machine run calculation tests
//!
//! Exercises the yield chain and gram-ratio projection end to end through the
//! shared crate's public API.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    compute_gram_ratio, compute_yield, is_bag_weight_out_of_range, parse_qty, BagEntry, RunInputs,
};
use std::str::FromStr;

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn run(bags: &[&str], bags_weight: &str, powder: &str, water_to_add: &str) -> RunInputs {
    RunInputs {
        bags_weight: bags_weight.to_string(),
        powder_weight: powder.to_string(),
        water_to_add: water_to_add.to_string(),
        bags: bags
            .iter()
            .enumerate()
            .map(|(i, w)| BagEntry::new(format!("bag-{}", i + 1), "2024-03-01", *w))
            .collect(),
        ..Default::default()
    }
}

// ============================================================================
// Worked example
// ============================================================================

#[test]
fn test_two_bag_run_end_to_end() {
    let result = compute_yield(&run(&["500", "300"], "50", "60", "200"));

    assert_eq!(result.total_bags_weight, dec("800.0"));
    assert_eq!(result.total_wet_weight, dec("750.0"));
    assert_eq!(result.water_removed, dec("690.0"));
    assert_eq!(result.power_to_pack_per_ml, dec("0.0870"));
    assert_eq!(result.packed_powder_weight, dec("17.4"));
    assert_eq!(result.packing_total, dec("217.4"));
    assert_eq!(result.water_content_percentage, dec("92.0"));
    assert_eq!(result.powder_per_unit, dec("0.0800"));
    assert_eq!(result.water_to_add_per_unit, dec("0.9200"));

    // Display precision is carried in the value itself
    assert_eq!(result.power_to_pack_per_ml.to_string(), "0.0870");
    assert_eq!(result.total_wet_weight.to_string(), "750.0");
}

#[test]
fn test_gram_ratio_projects_per_unit_ratios() {
    let mut inputs = run(&["500", "300"], "50", "60", "200");
    inputs.gram_ratio_staff_input = "250".to_string();

    let result = compute_gram_ratio(&inputs, &compute_yield(&inputs));

    assert_eq!(result.gram_ratio_packed_powder_weight, dec("20.0"));
    assert_eq!(result.gram_ratio_water_to_add, dec("230.0"));
    assert_eq!(result.gram_ratio_packing_total, dec("250.0"));
}

// ============================================================================
// Division guards
// ============================================================================

#[test]
fn test_no_water_removed_does_not_divide() {
    let result = compute_yield(&run(&["50"], "50", "50", "200"));

    assert_eq!(result.total_wet_weight, Decimal::ZERO);
    assert_eq!(result.water_removed, dec("-50.0"));
    assert_eq!(result.water_content_percentage, Decimal::ZERO);
    assert_eq!(result.powder_per_unit, Decimal::ZERO);

    let zero_removed = compute_yield(&run(&["160"], "40", "120", "200"));
    assert_eq!(zero_removed.water_removed, Decimal::ZERO);
    assert_eq!(zero_removed.power_to_pack_per_ml, Decimal::ZERO);
    assert_eq!(zero_removed.packing_total, dec("200.0"));
}

#[test]
fn test_empty_form() {
    let result = compute_yield(&RunInputs::default());

    assert_eq!(result.total_bags_weight, Decimal::ZERO);
    assert_eq!(result.packing_total, Decimal::ZERO);
    assert_eq!(result.water_to_add_per_unit, Decimal::ONE);
}

#[test]
fn test_unparseable_text_counts_as_zero() {
    assert_eq!(parse_qty("abc"), Decimal::ZERO);
    assert_eq!(parse_qty(""), Decimal::ZERO);
    assert_eq!(parse_qty("  42.5 "), dec("42.5"));

    let with_typo = compute_yield(&run(&["500", "O300"], "50", "60", "200"));
    assert_eq!(with_typo.total_bags_weight, dec("500.0"));
}

#[test]
fn test_leading_number_of_typed_text_is_used() {
    assert_eq!(parse_qty("25g"), dec("25"));
    assert_eq!(parse_qty("1_000"), dec("1"));
    assert!(is_bag_weight_out_of_range("25g"));
    assert!(is_bag_weight_out_of_range("450 g"));
    assert!(!is_bag_weight_out_of_range("250 g"));

    let with_units = compute_yield(&run(&["500 g", "3OO"], "50", "60", "200"));
    assert_eq!(with_units.total_bags_weight, dec("503.0"));
}

// ============================================================================
// Properties
// ============================================================================

fn weight_text() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..100_000, 0u32..10).prop_map(|(whole, tenth)| format!("{}.{}", whole, tenth)),
        Just(String::new()),
        "[a-z ]{0,6}",
        (-500i32..0).prop_map(|n| n.to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any text at all parses to some number
    #[test]
    fn parse_qty_is_total(text in ".{0,24}") {
        let _ = parse_qty(&text);
    }

    /// Any combination of inputs yields defined outputs
    #[test]
    fn yield_chain_is_total(
        bags in prop::collection::vec(weight_text(), 0..8),
        bags_weight in weight_text(),
        powder in weight_text(),
        water in weight_text(),
        target in weight_text(),
    ) {
        let mut inputs = run(&bags.iter().map(String::as_str).collect::<Vec<_>>(), &bags_weight, &powder, &water);
        inputs.gram_ratio_staff_input = target;

        let result = compute_yield(&inputs);
        let projection = compute_gram_ratio(&inputs, &result);

        prop_assert_eq!(
            projection.gram_ratio_packing_total,
            (projection.gram_ratio_packed_powder_weight + projection.gram_ratio_water_to_add).round_dp(1)
        );
        prop_assert!(result.total_bags_weight.scale() <= 1);
    }

    /// Same inputs, same outputs
    #[test]
    fn yield_chain_is_idempotent(
        bags in prop::collection::vec(weight_text(), 0..8),
        powder in weight_text(),
    ) {
        let inputs = run(&bags.iter().map(String::as_str).collect::<Vec<_>>(), "40", &powder, "100");
        prop_assert_eq!(compute_yield(&inputs), compute_yield(&inputs));
    }

    /// Water content and powder share always add back to the whole
    #[test]
    fn water_content_complements_powder_share(
        wet in 200u32..5000,
        powder_share in 5u32..20,
    ) {
        let powder = Decimal::from(wet * powder_share) / Decimal::from(100);
        let result = compute_yield(&run(&[&wet.to_string()], "0", &powder.to_string(), "0"));

        prop_assert_eq!(result.water_content_percentage, Decimal::from(100 - powder_share));
    }
}
