//! Gram-ratio projection onto a staff-chosen target volume

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{add, fixed, mul, parse_qty, RunInputs, YieldResult, WEIGHT_DP};

/// Powder and water needed for the staff target volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GramRatioResult {
    pub gram_ratio_packed_powder_weight: Decimal,
    pub gram_ratio_water_to_add: Decimal,
    pub gram_ratio_packing_total: Decimal,
}

/// Scale the per-unit ratios of `yield_result` to `gramRatioStaffInput` ml
pub fn compute_gram_ratio(inputs: &RunInputs, yield_result: &YieldResult) -> GramRatioResult {
    let target = parse_qty(&inputs.gram_ratio_staff_input);

    let packed_powder_weight = fixed(mul(yield_result.powder_per_unit, target), WEIGHT_DP);
    let water_to_add = fixed(mul(yield_result.water_to_add_per_unit, target), WEIGHT_DP);

    GramRatioResult {
        gram_ratio_packed_powder_weight: packed_powder_weight,
        gram_ratio_water_to_add: water_to_add,
        gram_ratio_packing_total: fixed(add(packed_powder_weight, water_to_add), WEIGHT_DP),
    }
}
