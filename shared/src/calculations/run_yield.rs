//! Yield chain: bag weights to packing totals

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{add, fixed, mul, parse_qty, ratio, sub, RunInputs, PERCENT_DP, RATIO_DP, WEIGHT_DP};

/// Derived quantities for a machine run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldResult {
    /// Sum of the individual bag weights (g)
    pub total_bags_weight: Decimal,
    /// Milk mass net of bag packaging (g)
    pub total_wet_weight: Decimal,
    /// Mass lost to dehydration (g)
    pub water_removed: Decimal,
    /// Powder per ml of removed water
    pub power_to_pack_per_ml: Decimal,
    pub packed_powder_weight: Decimal,
    /// Packed powder plus label water (ml)
    pub packing_total: Decimal,
    /// Share of the original milk mass that was water (%)
    pub water_content_percentage: Decimal,
    pub powder_per_unit: Decimal,
    pub water_to_add_per_unit: Decimal,
}

/// Run the yield chain.
///
/// Each step consumes the rounded value of the step before it, so the
/// figures agree with one another as displayed.
pub fn compute_yield(inputs: &RunInputs) -> YieldResult {
    let powder_weight = parse_qty(&inputs.powder_weight);
    let water_to_add = parse_qty(&inputs.water_to_add);

    let total_bags_weight = fixed(
        inputs
            .bags
            .iter()
            .map(|bag| parse_qty(&bag.weight))
            .fold(Decimal::ZERO, add),
        WEIGHT_DP,
    );
    let total_wet_weight = fixed(
        sub(total_bags_weight, parse_qty(&inputs.bags_weight)),
        WEIGHT_DP,
    );
    let water_removed = fixed(sub(total_wet_weight, powder_weight), WEIGHT_DP);
    let power_to_pack_per_ml = fixed(ratio(powder_weight, water_removed), RATIO_DP);
    let packed_powder_weight = fixed(mul(water_to_add, power_to_pack_per_ml), WEIGHT_DP);
    let packing_total = fixed(add(packed_powder_weight, water_to_add), WEIGHT_DP);

    let water_content_percentage = if total_wet_weight.is_zero() {
        fixed(Decimal::ZERO, PERCENT_DP)
    } else {
        let powder_share = mul(ratio(powder_weight, total_wet_weight), Decimal::ONE_HUNDRED);
        fixed(sub(Decimal::ONE_HUNDRED, powder_share), PERCENT_DP)
    };

    let powder_per_unit = fixed(ratio(powder_weight, total_wet_weight), RATIO_DP);
    let water_to_add_per_unit = fixed(sub(Decimal::ONE, powder_per_unit), RATIO_DP);

    YieldResult {
        total_bags_weight,
        total_wet_weight,
        water_removed,
        power_to_pack_per_ml,
        packed_powder_weight,
        packing_total,
        water_content_percentage,
        powder_per_unit,
        water_to_add_per_unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::BagEntry;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn inputs(bags: &[&str], bags_weight: &str, powder: &str, water: &str) -> RunInputs {
        RunInputs {
            bags_weight: bags_weight.to_string(),
            powder_weight: powder.to_string(),
            water_to_add: water.to_string(),
            bags: bags
                .iter()
                .enumerate()
                .map(|(i, w)| BagEntry::new(format!("bag-{}", i + 1), "2024-03-01", *w))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_typical_run() {
        let result = compute_yield(&inputs(&["500", "300"], "50", "60", "200"));

        assert_eq!(result.total_bags_weight, dec("800.0"));
        assert_eq!(result.total_wet_weight, dec("750.0"));
        assert_eq!(result.water_removed, dec("690.0"));
        assert_eq!(result.power_to_pack_per_ml, dec("0.0870"));
        assert_eq!(result.packed_powder_weight, dec("17.4"));
        assert_eq!(result.packing_total, dec("217.4"));
        assert_eq!(result.water_content_percentage, dec("92.0"));
        assert_eq!(result.powder_per_unit, dec("0.0800"));
        assert_eq!(result.water_to_add_per_unit, dec("0.9200"));
    }

    #[test]
    fn test_outputs_keep_display_scale() {
        let result = compute_yield(&inputs(&["500", "300"], "50", "60", "200"));

        assert_eq!(result.total_bags_weight.to_string(), "800.0");
        assert_eq!(result.powder_per_unit.to_string(), "0.0800");
    }

    #[test]
    fn test_packed_powder_uses_rounded_ratio() {
        // 60 / 690 displays as 0.0870; the unrounded ratio would give 869.6 here
        let result = compute_yield(&inputs(&["500", "300"], "50", "60", "10000"));
        assert_eq!(result.packed_powder_weight, dec("870.0"));
    }

    #[test]
    fn test_zero_water_removed_guard() {
        // wet weight 100, powder 100: nothing removed
        let result = compute_yield(&inputs(&["150"], "50", "100", "200"));

        assert_eq!(result.water_removed, Decimal::ZERO);
        assert_eq!(result.power_to_pack_per_ml, Decimal::ZERO);
        assert_eq!(result.packed_powder_weight, Decimal::ZERO);
        assert_eq!(result.packing_total, dec("200.0"));
    }

    #[test]
    fn test_zero_wet_weight_guard() {
        let result = compute_yield(&inputs(&["50"], "50", "50", ""));

        assert_eq!(result.total_wet_weight, Decimal::ZERO);
        assert_eq!(result.water_removed, dec("-50.0"));
        assert_eq!(result.water_content_percentage, Decimal::ZERO);
        assert_eq!(result.powder_per_unit, Decimal::ZERO);
        assert_eq!(result.water_to_add_per_unit, Decimal::ONE);
    }
}
