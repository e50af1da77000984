//! Form snapshot types consumed by the calculation core

use serde::{Deserialize, Serialize};

/// One physically weighed bag of thawed milk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BagEntry {
    pub id: String,
    /// Processing day this bag belongs to (`YYYY-MM-DD`, may be blank)
    pub date: String,
    /// Weight in grams as typed
    pub weight: String,
}

impl BagEntry {
    pub fn new(id: impl Into<String>, date: impl Into<String>, weight: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            weight: weight.into(),
        }
    }
}

/// Calculation inputs for a machine run, exactly as typed.
///
/// Replaced wholesale on every edit; derived values are recomputed from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunInputs {
    /// Combined weight of the empty bags (g)
    pub bags_weight: String,
    /// Declared powder output (g)
    pub powder_weight: String,
    /// Requested packing volume (ml)
    pub packing_requirements: String,
    /// Water to add, as printed on the label (ml)
    pub water_to_add: String,
    pub water_activity_level: String,
    /// Target volume for the gram-ratio projection (ml)
    pub gram_ratio_staff_input: String,
    pub bags: Vec<BagEntry>,
}

/// One repackaging batch: powder weight per unit times number of units
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrossCheckEntry {
    pub id: String,
    pub powder_weight: String,
    pub quantity: String,
}

impl CrossCheckEntry {
    pub fn new(id: impl Into<String>, powder_weight: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            powder_weight: powder_weight.into(),
            quantity: quantity.into(),
        }
    }
}
