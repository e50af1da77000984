//! Order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::Customer;

/// A customer order of milk to be processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub org_id: String,
    pub shopify_order_id: String,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub shipping_addr_1: Option<String>,
    pub shipping_addr_2: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    /// Temperature on arrival (°C)
    pub arrival_temp: Option<Decimal>,
    /// Gross weight on arrival (g)
    pub arrival_weight: Option<Decimal>,
    pub visual_check: Option<VisualCheck>,
    pub visual_check_remarks: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order with its customer, as listed on the orders table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithCustomer {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Customer,
}

/// Order lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown order status: {}", s))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// Result of the visual inspection on arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualCheck {
    Passed,
    Flagged,
}

impl VisualCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualCheck::Passed => "passed",
            VisualCheck::Flagged => "flagged",
        }
    }
}

impl FromStr for VisualCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(VisualCheck::Passed),
            "flagged" => Ok(VisualCheck::Flagged),
            _ => Err(format!("Unknown visual check result: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trips_through_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
    }

    #[test]
    fn test_visual_check_parse() {
        assert_eq!("flagged".parse::<VisualCheck>(), Ok(VisualCheck::Flagged));
        assert!("unknown".parse::<VisualCheck>().is_err());
    }
}
