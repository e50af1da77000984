//! Everything the run outputs panel shows, computed in one pass

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    compute_cross_check_with_tolerance, compute_gram_ratio, compute_yield, parse_qty,
    CrossCheckEntry, CrossCheckResult, GramRatioResult, RunInputs, YieldResult,
};
use crate::validation::{is_bag_weight_out_of_range, water_content_outside_band};

/// Derived outputs and advisory flags for one machine run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    #[serde(rename = "yield")]
    pub yield_result: YieldResult,
    pub gram_ratio: GramRatioResult,
    pub cross_check: CrossCheckResult,
    pub water_content_out_of_range: bool,
    /// Ids of bags whose weight falls outside the expected band
    pub out_of_range_bag_ids: Vec<String>,
}

impl RunSummary {
    /// True when any advisory check wants the operator's attention
    pub fn has_warnings(&self) -> bool {
        !self.cross_check.is_within_tolerance
            || self.water_content_out_of_range
            || !self.out_of_range_bag_ids.is_empty()
    }
}

/// Compute every derived value for a run.
///
/// Cross-checks are reconciled against the run's declared powder weight.
pub fn compute_run_summary(
    inputs: &RunInputs,
    cross_checks: &[CrossCheckEntry],
    tolerance_percent: Decimal,
) -> RunSummary {
    let yield_result = compute_yield(inputs);
    let gram_ratio = compute_gram_ratio(inputs, &yield_result);
    let cross_check = compute_cross_check_with_tolerance(
        cross_checks,
        parse_qty(&inputs.powder_weight),
        tolerance_percent,
    );

    let out_of_range_bag_ids = inputs
        .bags
        .iter()
        .filter(|bag| is_bag_weight_out_of_range(&bag.weight))
        .map(|bag| bag.id.clone())
        .collect();

    RunSummary {
        water_content_out_of_range: water_content_outside_band(yield_result.water_content_percentage),
        yield_result,
        gram_ratio,
        cross_check,
        out_of_range_bag_ids,
    }
}
