//! Order service

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{Customer, Order, OrderStatus, OrderWithCustomer, VisualCheck};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::TenantContext;

use super::customer::{CustomerRow, CUSTOMER_COLUMNS};
use super::stored_status;

/// Order service for intake of milk shipments
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Database row for an order
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    org_id: String,
    shopify_order_id: String,
    customer_id: Uuid,
    status: String,
    shipping_addr_1: Option<String>,
    shipping_addr_2: Option<String>,
    postal_code: Option<String>,
    phone: Option<String>,
    arrival_temp: Option<Decimal>,
    arrival_weight: Option<Decimal>,
    visual_check: Option<String>,
    visual_check_remarks: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            org_id: row.org_id,
            shopify_order_id: row.shopify_order_id,
            customer_id: row.customer_id,
            status: stored_status(row.id, &row.status),
            shipping_addr_1: row.shipping_addr_1,
            shipping_addr_2: row.shipping_addr_2,
            postal_code: row.postal_code,
            phone: row.phone,
            arrival_temp: row.arrival_temp,
            arrival_weight: row.arrival_weight,
            visual_check: row.visual_check.and_then(|v| v.parse().ok()),
            visual_check_remarks: row.visual_check_remarks,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ORDER_COLUMNS: &str = "id, org_id, shopify_order_id, customer_id, status, \
     shipping_addr_1, shipping_addr_2, postal_code, phone, arrival_temp, arrival_weight, \
     visual_check, visual_check_remarks, created_by, created_at, updated_at";

/// Input for creating an order
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[validate(length(min = 1, max = 100))]
    pub shopify_order_id: String,
    pub customer_id: Uuid,
    #[serde(default)]
    pub status: OrderStatus,
    pub shipping_addr_1: Option<String>,
    pub shipping_addr_2: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub arrival_temp: Option<Decimal>,
    pub arrival_weight: Option<Decimal>,
    pub visual_check: Option<VisualCheck>,
    pub visual_check_remarks: Option<String>,
}

/// Input for updating an order; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOrderInput {
    #[validate(length(min = 1, max = 100))]
    pub shopify_order_id: Option<String>,
    pub status: Option<OrderStatus>,
    pub shipping_addr_1: Option<String>,
    pub shipping_addr_2: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub arrival_temp: Option<Decimal>,
    pub arrival_weight: Option<Decimal>,
    pub visual_check: Option<VisualCheck>,
    pub visual_check_remarks: Option<String>,
}

/// Query filter for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List orders with their customers, newest first
    pub async fn list(
        &self,
        tenant: &TenantContext,
        filter: OrderFilter,
    ) -> AppResult<Vec<OrderWithCustomer>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {} FROM orders
            WHERE org_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
            ORDER_COLUMNS
        ))
        .bind(&tenant.org_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        let customer_ids: Vec<Uuid> = rows.iter().map(|r| r.customer_id).collect();
        let customers: HashMap<Uuid, Customer> = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE org_id = $1 AND id = ANY($2)",
            CUSTOMER_COLUMNS
        ))
        .bind(&tenant.org_id)
        .bind(&customer_ids)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|row| {
            let customer = Customer::from(row);
            (customer.id, customer)
        })
        .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let customer = customers.get(&row.customer_id).cloned();
                if customer.is_none() {
                    tracing::warn!(order_id = %row.id, "Order has no customer in this organization");
                }
                customer.map(|customer| OrderWithCustomer {
                    order: row.into(),
                    customer,
                })
            })
            .collect())
    }

    /// Get an order with its customer
    pub async fn get(&self, tenant: &TenantContext, order_id: Uuid) -> AppResult<OrderWithCustomer> {
        let order = self.get_order(tenant, order_id).await?;
        let customer = self.get_customer(tenant, order.customer_id).await?;
        Ok(OrderWithCustomer { order, customer })
    }

    /// Create an order for one of the organization's customers
    pub async fn create(
        &self,
        tenant: &TenantContext,
        input: CreateOrderInput,
    ) -> AppResult<OrderWithCustomer> {
        input.validate()?;
        let customer = self.get_customer(tenant, input.customer_id).await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (org_id, shopify_order_id, customer_id, status,
                                shipping_addr_1, shipping_addr_2, postal_code, phone,
                                arrival_temp, arrival_weight, visual_check,
                                visual_check_remarks, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&tenant.org_id)
        .bind(input.shopify_order_id.trim())
        .bind(input.customer_id)
        .bind(input.status.as_str())
        .bind(&input.shipping_addr_1)
        .bind(&input.shipping_addr_2)
        .bind(&input.postal_code)
        .bind(&input.phone)
        .bind(input.arrival_temp)
        .bind(input.arrival_weight)
        .bind(input.visual_check.map(|v| v.as_str()))
        .bind(&input.visual_check_remarks)
        .bind(&tenant.user_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(order_id = %row.id, org_id = %tenant.org_id, "Order created");
        Ok(OrderWithCustomer {
            order: row.into(),
            customer,
        })
    }

    /// Update an order
    pub async fn update(
        &self,
        tenant: &TenantContext,
        order_id: Uuid,
        input: UpdateOrderInput,
    ) -> AppResult<OrderWithCustomer> {
        input.validate()?;

        let order: Order = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders SET
                shopify_order_id = COALESCE($3, shopify_order_id),
                status = COALESCE($4, status),
                shipping_addr_1 = COALESCE($5, shipping_addr_1),
                shipping_addr_2 = COALESCE($6, shipping_addr_2),
                postal_code = COALESCE($7, postal_code),
                phone = COALESCE($8, phone),
                arrival_temp = COALESCE($9, arrival_temp),
                arrival_weight = COALESCE($10, arrival_weight),
                visual_check = COALESCE($11, visual_check),
                visual_check_remarks = COALESCE($12, visual_check_remarks),
                updated_at = NOW()
            WHERE id = $1 AND org_id = $2
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(&tenant.org_id)
        .bind(input.shopify_order_id.as_deref().map(str::trim))
        .bind(input.status.map(|s| s.as_str()))
        .bind(&input.shipping_addr_1)
        .bind(&input.shipping_addr_2)
        .bind(&input.postal_code)
        .bind(&input.phone)
        .bind(input.arrival_temp)
        .bind(input.arrival_weight)
        .bind(input.visual_check.map(|v| v.as_str()))
        .bind(&input.visual_check_remarks)
        .fetch_optional(&self.db)
        .await?
        .map(Order::from)
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        if let Some(status) = input.status {
            tracing::info!(%order_id, %status, "Order status updated");
        }

        let customer = self.get_customer(tenant, order.customer_id).await?;
        Ok(OrderWithCustomer { order, customer })
    }

    /// Delete an order; its machine runs must be removed first
    pub async fn delete(&self, tenant: &TenantContext, order_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND org_id = $2")
            .bind(order_id)
            .bind(&tenant.org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        tracing::info!(%order_id, org_id = %tenant.org_id, "Order deleted");
        Ok(())
    }

    async fn get_order(&self, tenant: &TenantContext, order_id: Uuid) -> AppResult<Order> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1 AND org_id = $2",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(&tenant.org_id)
        .fetch_optional(&self.db)
        .await?
        .map(Order::from)
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    async fn get_customer(&self, tenant: &TenantContext, customer_id: Uuid) -> AppResult<Customer> {
        sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE id = $1 AND org_id = $2",
            CUSTOMER_COLUMNS
        ))
        .bind(customer_id)
        .bind(&tenant.org_id)
        .fetch_optional(&self.db)
        .await?
        .map(Customer::from)
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }
}
