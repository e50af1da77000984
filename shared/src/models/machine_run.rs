//! Machine run models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::calculations::{BagEntry, CrossCheckEntry, RunInputs};

/// One batch of milk through the drying machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineRun {
    pub id: Uuid,
    pub org_id: String,
    pub order_id: Uuid,
    /// 1-based, per order
    pub run_number: i32,
    pub status: MachineRunStatus,
    pub mama_name: String,
    pub mama_nric: String,
    pub date_received: Option<NaiveDate>,
    pub date_processed: Option<NaiveDate>,
    pub date_packed: Option<NaiveDate>,
    pub bags_weight_g: Option<Decimal>,
    pub powder_weight_g: Option<Decimal>,
    pub packing_requirements_ml: Option<Decimal>,
    pub label_water_to_add_ml: Option<Decimal>,
    pub water_activity_level: Option<Decimal>,
    pub gram_ratio_staff_input_ml: Option<Decimal>,
    pub handled_by: Option<String>,
    pub verified_by: Option<String>,
    pub remarks: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Machine run lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineRunStatus {
    #[default]
    Pending,
    Documented,
    Processing,
    Completed,
    QaFailed,
    Cancelled,
}

impl MachineRunStatus {
    pub const ALL: [MachineRunStatus; 6] = [
        MachineRunStatus::Pending,
        MachineRunStatus::Documented,
        MachineRunStatus::Processing,
        MachineRunStatus::Completed,
        MachineRunStatus::QaFailed,
        MachineRunStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MachineRunStatus::Pending => "pending",
            MachineRunStatus::Documented => "documented",
            MachineRunStatus::Processing => "processing",
            MachineRunStatus::Completed => "completed",
            MachineRunStatus::QaFailed => "qa_failed",
            MachineRunStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for MachineRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MachineRunStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown machine run status: {}", s))
    }
}

impl std::fmt::Display for MachineRunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineRunStatus::Pending => write!(f, "Pending"),
            MachineRunStatus::Documented => write!(f, "Documented"),
            MachineRunStatus::Processing => write!(f, "Processing"),
            MachineRunStatus::Completed => write!(f, "Completed"),
            MachineRunStatus::QaFailed => write!(f, "QA Failed"),
            MachineRunStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A weighed bag belonging to a machine run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualBag {
    pub id: Uuid,
    pub machine_run_id: Uuid,
    /// 1-based, in entry order
    pub bag_number: i32,
    pub date_expressed: Option<NaiveDate>,
    pub weight_g: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted cross-check row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossCheck {
    pub id: Uuid,
    pub machine_run_id: Uuid,
    /// 1-based, in entry order
    pub check_number: i32,
    pub powder_weight_g: Decimal,
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Machine run with its bags and cross-checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineRunWithDetails {
    #[serde(flatten)]
    pub run: MachineRun,
    pub individual_bags: Vec<IndividualBag>,
    pub cross_checks: Vec<CrossCheck>,
}

fn decimal_text(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl MachineRunWithDetails {
    /// Load the persisted run back into the form shape for editing
    pub fn to_run_inputs(&self) -> RunInputs {
        RunInputs {
            bags_weight: decimal_text(self.run.bags_weight_g),
            powder_weight: decimal_text(self.run.powder_weight_g),
            packing_requirements: decimal_text(self.run.packing_requirements_ml),
            water_to_add: decimal_text(self.run.label_water_to_add_ml),
            water_activity_level: decimal_text(self.run.water_activity_level),
            gram_ratio_staff_input: decimal_text(self.run.gram_ratio_staff_input_ml),
            bags: self
                .individual_bags
                .iter()
                .map(|bag| BagEntry {
                    id: bag.id.to_string(),
                    date: bag
                        .date_expressed
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                    weight: decimal_text(bag.weight_g),
                })
                .collect(),
        }
    }

    /// Cross-check rows in the form shape
    pub fn cross_check_entries(&self) -> Vec<CrossCheckEntry> {
        self.cross_checks
            .iter()
            .map(|check| CrossCheckEntry {
                id: check.id.to_string(),
                powder_weight: check.powder_weight_g.to_string(),
                quantity: check.quantity.to_string(),
            })
            .collect()
    }
}
