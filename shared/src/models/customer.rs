//! Customer models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer who sends milk in for processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub org_id: String,
    pub shopify_customer_id: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub shipping_addr_1: Option<String>,
    pub shipping_addr_2: Option<String>,
    pub postal_code: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
