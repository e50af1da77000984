//! Reconciliation of repackaged powder against the declared powder weight

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{add, fixed, mul, parse_qty, ratio, sub, CrossCheckEntry, CROSS_CHECK_DP};

/// Allowed variance between declared and weighed powder (±%)
pub const CROSS_CHECK_TOLERANCE_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Outcome of a cross-check pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossCheckResult {
    /// Per-entry totals, in entry order
    pub row_totals: Vec<Decimal>,
    pub combined_total: Decimal,
    pub expected_weight: Decimal,
    /// `combined_total - expected_weight`
    pub difference: Decimal,
    pub variance_pct: Decimal,
    pub is_within_tolerance: bool,
}

fn row_total_exact(entry: &CrossCheckEntry) -> Decimal {
    mul(parse_qty(&entry.powder_weight), parse_qty(&entry.quantity))
}

/// Powder weight times quantity for one entry
pub fn row_total(entry: &CrossCheckEntry) -> Decimal {
    fixed(row_total_exact(entry), CROSS_CHECK_DP)
}

/// Reconcile against the default ±5% band
pub fn compute_cross_check(entries: &[CrossCheckEntry], expected_weight: Decimal) -> CrossCheckResult {
    compute_cross_check_with_tolerance(entries, expected_weight, CROSS_CHECK_TOLERANCE_PERCENT)
}

/// Reconcile against a caller-supplied band.
///
/// Nothing declared means nothing to violate: a zero expected weight is
/// always within tolerance with zero variance. The verdict is taken on the
/// unrounded variance.
pub fn compute_cross_check_with_tolerance(
    entries: &[CrossCheckEntry],
    expected_weight: Decimal,
    tolerance_percent: Decimal,
) -> CrossCheckResult {
    let exact_rows: Vec<Decimal> = entries.iter().map(row_total_exact).collect();
    let combined_total = exact_rows.iter().copied().fold(Decimal::ZERO, add);
    let difference = sub(combined_total, expected_weight);

    let (variance_pct, is_within_tolerance) = if expected_weight.is_zero() {
        (Decimal::ZERO, true)
    } else {
        let variance = mul(ratio(difference, expected_weight), Decimal::ONE_HUNDRED);
        (variance, variance.abs() <= tolerance_percent)
    };

    CrossCheckResult {
        row_totals: exact_rows
            .into_iter()
            .map(|row| fixed(row, CROSS_CHECK_DP))
            .collect(),
        combined_total: fixed(combined_total, CROSS_CHECK_DP),
        expected_weight: fixed(expected_weight, CROSS_CHECK_DP),
        difference: fixed(difference, CROSS_CHECK_DP),
        variance_pct: fixed(variance_pct, CROSS_CHECK_DP),
        is_within_tolerance,
    }
}
