//! Machine run record tests
//!
//! Wizard step gates, plausibility flags and the edit lifecycle of a saved run.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    compute_run_summary, is_bag_weight_out_of_range, is_water_content_out_of_range,
    validate_individual_bags, validate_run_identity, BagEntry, CrossCheck, IndividualBag,
    MachineRun, MachineRunStatus, MachineRunWithDetails, CROSS_CHECK_TOLERANCE_PERCENT,
};
use uuid::Uuid;

fn saved_run() -> MachineRunWithDetails {
    let run_id = Uuid::new_v4();
    let now = Utc::now();
    let bag = |number: i32, weight: i64| IndividualBag {
        id: Uuid::new_v4(),
        machine_run_id: run_id,
        bag_number: number,
        date_expressed: NaiveDate::from_ymd_opt(2024, 2, 27),
        weight_g: Some(Decimal::from(weight)),
        created_at: now,
        updated_at: now,
    };

    MachineRunWithDetails {
        run: MachineRun {
            id: run_id,
            org_id: "org_milk".to_string(),
            order_id: Uuid::new_v4(),
            run_number: 2,
            status: MachineRunStatus::Documented,
            mama_name: "Aisha".to_string(),
            mama_nric: "S1234567D".to_string(),
            date_received: NaiveDate::from_ymd_opt(2024, 3, 1),
            date_processed: NaiveDate::from_ymd_opt(2024, 3, 2),
            date_packed: None,
            bags_weight_g: Some(Decimal::from(50)),
            powder_weight_g: Some(Decimal::from(60)),
            packing_requirements_ml: None,
            label_water_to_add_ml: Some(Decimal::from(200)),
            water_activity_level: Some(Decimal::new(25, 2)),
            gram_ratio_staff_input_ml: None,
            handled_by: Some("Mei".to_string()),
            verified_by: None,
            remarks: None,
            created_by: "user_1".to_string(),
            created_at: now,
            updated_at: now,
        },
        individual_bags: vec![bag(1, 500), bag(2, 300)],
        cross_checks: vec![CrossCheck {
            id: Uuid::new_v4(),
            machine_run_id: run_id,
            check_number: 1,
            powder_weight_g: Decimal::from(10),
            quantity: Decimal::from(6),
            created_at: now,
        }],
    }
}

// ============================================================================
// Wizard step gates
// ============================================================================

#[test]
fn test_identity_step_requires_name_nric_and_date() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1);

    assert!(validate_run_identity("Aisha", "S1234567D", date).is_ok());
    assert!(validate_run_identity("", "S1234567D", date).is_err());
    assert!(validate_run_identity("Aisha", "  ", date).is_err());
    assert!(validate_run_identity("Aisha", "S1234567D", None).is_err());
}

#[test]
fn test_bags_step_requires_dated_weighed_bags() {
    assert!(validate_individual_bags(&[]).is_err());
    assert!(validate_individual_bags(&[BagEntry::new("a", "2024-02-27", "250")]).is_ok());
    assert!(validate_individual_bags(&[BagEntry::new("a", "", "250")]).is_err());
    assert!(validate_individual_bags(&[BagEntry::new("a", "2024-02-27", " ")]).is_err());
}

// ============================================================================
// Plausibility flags
// ============================================================================

#[test]
fn test_bag_weight_flags() {
    assert!(is_bag_weight_out_of_range("25"));
    assert!(is_bag_weight_out_of_range("400.5"));
    assert!(!is_bag_weight_out_of_range("350"));
    assert!(!is_bag_weight_out_of_range("30"));
    assert!(!is_bag_weight_out_of_range("400"));
    assert!(!is_bag_weight_out_of_range("0"));
    assert!(!is_bag_weight_out_of_range(""));
    assert!(!is_bag_weight_out_of_range("heavy"));
}

#[test]
fn test_water_content_flags() {
    assert!(!is_water_content_out_of_range(Some("85")));
    assert!(!is_water_content_out_of_range(Some("89.5")));
    assert!(is_water_content_out_of_range(Some("84.9")));
    assert!(is_water_content_out_of_range(Some("89.6")));
    assert!(!is_water_content_out_of_range(None));
    assert!(!is_water_content_out_of_range(Some("")));
}

// ============================================================================
// Edit lifecycle
// ============================================================================

#[test]
fn test_saved_run_reloads_into_form_shape() {
    let run = saved_run();
    let inputs = run.to_run_inputs();
    let checks = run.cross_check_entries();

    assert_eq!(inputs.bags_weight, "50");
    assert_eq!(inputs.water_activity_level, "0.25");
    assert_eq!(inputs.packing_requirements, "");
    assert_eq!(
        inputs.bags.iter().map(|b| b.weight.as_str()).collect::<Vec<_>>(),
        vec!["500", "300"]
    );
    assert_eq!(checks.len(), 1);
}

#[test]
fn test_reloaded_run_computes_same_outputs() {
    let run = saved_run();
    let summary = compute_run_summary(
        &run.to_run_inputs(),
        &run.cross_check_entries(),
        CROSS_CHECK_TOLERANCE_PERCENT,
    );

    assert_eq!(summary.yield_result.packing_total.to_string(), "217.4");
    assert_eq!(summary.cross_check.combined_total.to_string(), "60.00");
    assert!(summary.cross_check.is_within_tolerance);
}

#[test]
fn test_saved_run_serializes_flat() {
    let json = serde_json::to_value(saved_run()).unwrap();

    assert_eq!(json["run_number"], 2);
    assert_eq!(json["status"], "documented");
    assert_eq!(json["individual_bags"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["cross_checks"][0]["check_number"], 1);
}
