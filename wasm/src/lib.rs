//! WebAssembly module for the Breastmilk Processing Operations Platform
//!
//! Runs the machine-run calculations in the browser so the outputs panel can
//! recompute on every keystroke. Structured values cross the boundary as JSON;
//! decimals are serialized as fixed-precision strings ("0.0800", "750.0").

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::{CrossCheckEntry, RunInputs, YieldResult, CROSS_CHECK_TOLERANCE_PERCENT};
use wasm_bindgen::prelude::*;

fn js_error(context: &str, e: serde_json::Error) -> JsValue {
    js_sys::Error::new(&format!("{}: {}", context, e)).into()
}

fn decimal_or_zero(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn tolerance_or_default(tolerance_percent: Option<f64>) -> Decimal {
    tolerance_percent
        .and_then(|t| Decimal::try_from(t).ok())
        .filter(|t| *t >= Decimal::ZERO)
        .unwrap_or(CROSS_CHECK_TOLERANCE_PERCENT)
}

fn yield_json(inputs_json: &str) -> Result<String, serde_json::Error> {
    let inputs: RunInputs = serde_json::from_str(inputs_json)?;
    serde_json::to_string(&shared::compute_yield(&inputs))
}

fn gram_ratio_json(inputs_json: &str, yield_json: &str) -> Result<String, serde_json::Error> {
    let inputs: RunInputs = serde_json::from_str(inputs_json)?;
    let yield_result: YieldResult = serde_json::from_str(yield_json)?;
    serde_json::to_string(&shared::compute_gram_ratio(&inputs, &yield_result))
}

fn cross_check_json(entries_json: &str, expected_weight: Decimal) -> Result<String, serde_json::Error> {
    let entries: Vec<CrossCheckEntry> = serde_json::from_str(entries_json)?;
    serde_json::to_string(&shared::compute_cross_check(&entries, expected_weight))
}

fn run_summary_json(
    inputs_json: &str,
    cross_checks_json: &str,
    tolerance: Decimal,
) -> Result<String, serde_json::Error> {
    let inputs: RunInputs = serde_json::from_str(inputs_json)?;
    let cross_checks: Vec<CrossCheckEntry> = serde_json::from_str(cross_checks_json)?;
    serde_json::to_string(&shared::compute_run_summary(&inputs, &cross_checks, tolerance))
}

/// Parse a typed quantity, 0 when blank or not a number
#[wasm_bindgen]
pub fn parse_qty(text: &str) -> f64 {
    shared::parse_qty(text).to_f64().unwrap_or(0.0)
}

/// Yield chain for a form snapshot (`RunInputs` JSON)
#[wasm_bindgen]
pub fn compute_yield(inputs_json: &str) -> Result<String, JsValue> {
    yield_json(inputs_json).map_err(|e| js_error("Invalid run inputs JSON", e))
}

/// Gram-ratio projection from the inputs and a previously computed yield
#[wasm_bindgen]
pub fn compute_gram_ratio(inputs_json: &str, yield_json: &str) -> Result<String, JsValue> {
    gram_ratio_json(inputs_json, yield_json).map_err(|e| js_error("Invalid gram ratio JSON", e))
}

/// Reconcile cross-check weigh-ins against the declared powder weight
#[wasm_bindgen]
pub fn compute_cross_check(entries_json: &str, expected_weight: f64) -> Result<String, JsValue> {
    cross_check_json(entries_json, decimal_or_zero(expected_weight))
        .map_err(|e| js_error("Invalid cross-check JSON", e))
}

/// Every output and advisory flag for the run in one call.
///
/// `tolerance_percent` defaults to ±5% when omitted, negative or not finite.
#[wasm_bindgen]
pub fn compute_run_summary(
    inputs_json: &str,
    cross_checks_json: &str,
    tolerance_percent: Option<f64>,
) -> Result<String, JsValue> {
    run_summary_json(inputs_json, cross_checks_json, tolerance_or_default(tolerance_percent))
        .map_err(|e| js_error("Invalid run summary JSON", e))
}

#[wasm_bindgen]
pub fn is_bag_weight_out_of_range(weight: &str) -> bool {
    shared::is_bag_weight_out_of_range(weight)
}

#[wasm_bindgen]
pub fn is_water_content_out_of_range(percentage: Option<String>) -> bool {
    shared::is_water_content_out_of_range(percentage.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUTS: &str = r#"{
        "bagsWeight": "50",
        "powderWeight": "60",
        "waterToAdd": "200",
        "bags": [
            { "id": "a", "date": "2024-02-27", "weight": "500" },
            { "id": "b", "date": "2024-02-27", "weight": "300" }
        ]
    }"#;

    #[test]
    fn test_parse_qty() {
        assert_eq!(parse_qty(" 12.5 "), 12.5);
        assert_eq!(parse_qty("abc"), 0.0);
        assert_eq!(parse_qty(""), 0.0);
    }

    #[test]
    fn test_yield_json_uses_display_precision() {
        let json: serde_json::Value = serde_json::from_str(&yield_json(INPUTS).unwrap()).unwrap();

        assert_eq!(json["totalBagsWeight"], "800.0");
        assert_eq!(json["totalWetWeight"], "750.0");
        assert_eq!(json["powerToPackPerMl"], "0.0870");
        assert_eq!(json["powderPerUnit"], "0.0800");
    }

    #[test]
    fn test_gram_ratio_json_chains_from_yield() {
        let inputs = INPUTS.replace("\"waterToAdd\"", "\"gramRatioStaffInput\": \"100\", \"waterToAdd\"");
        let yield_result = yield_json(&inputs).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&gram_ratio_json(&inputs, &yield_result).unwrap()).unwrap();

        assert_eq!(json["gramRatioPackedPowderWeight"], "8.0");
        assert_eq!(json["gramRatioWaterToAdd"], "92.0");
        assert_eq!(json["gramRatioPackingTotal"], "100.0");
    }

    #[test]
    fn test_cross_check_json() {
        let entries = r#"[
            { "id": "1", "powderWeight": "10", "quantity": "5" },
            { "id": "2", "powderWeight": "8", "quantity": "3" }
        ]"#;
        let json: serde_json::Value =
            serde_json::from_str(&cross_check_json(entries, Decimal::from(90)).unwrap()).unwrap();

        assert_eq!(json["combinedTotal"], "74.00");
        assert_eq!(json["isWithinTolerance"], false);
    }

    #[test]
    fn test_run_summary_json() {
        let json: serde_json::Value = serde_json::from_str(
            &run_summary_json(INPUTS, "[]", CROSS_CHECK_TOLERANCE_PERCENT).unwrap(),
        )
        .unwrap();

        assert_eq!(json["yield"]["packingTotal"], "217.4");
        assert_eq!(json["outOfRangeBagIds"], serde_json::json!(["a"]));
    }

    #[test]
    fn test_tolerance_falls_back_to_default() {
        assert_eq!(tolerance_or_default(None), CROSS_CHECK_TOLERANCE_PERCENT);
        assert_eq!(tolerance_or_default(Some(-1.0)), CROSS_CHECK_TOLERANCE_PERCENT);
        assert_eq!(tolerance_or_default(Some(f64::NAN)), CROSS_CHECK_TOLERANCE_PERCENT);
        assert_eq!(tolerance_or_default(Some(f64::INFINITY)), CROSS_CHECK_TOLERANCE_PERCENT);
        assert_eq!(tolerance_or_default(Some(0.0)), Decimal::ZERO);
        assert_eq!(tolerance_or_default(Some(2.5)), Decimal::new(25, 1));
    }

    #[test]
    fn test_negative_tolerance_does_not_fail_every_check() {
        // 74 against 75 is within the default band
        let checks = r#"[{ "id": "1", "powderWeight": "74", "quantity": "1" }]"#;
        let inputs = r#"{ "powderWeight": "75" }"#;
        let json: serde_json::Value = serde_json::from_str(
            &run_summary_json(inputs, checks, tolerance_or_default(Some(-5.0))).unwrap(),
        )
        .unwrap();

        assert_eq!(json["crossCheck"]["isWithinTolerance"], true);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(yield_json("not json").is_err());
        assert!(cross_check_json("{}", Decimal::ZERO).is_err());
    }

    #[test]
    fn test_range_flags() {
        assert!(is_bag_weight_out_of_range("25"));
        assert!(is_bag_weight_out_of_range("25g"));
        assert!(!is_bag_weight_out_of_range("350"));
        assert!(!is_water_content_out_of_range(None));
        assert!(is_water_content_out_of_range(Some("92.0".to_string())));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_malformed_json_raises() {
        assert!(compute_yield("not json").is_err());
        assert!(compute_run_summary("{}", "[]", None).is_ok());
    }
}
