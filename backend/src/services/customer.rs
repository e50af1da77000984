//! Customer service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::Customer;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::TenantContext;

/// Customer service for managing the people who send milk in
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Database row for a customer
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CustomerRow {
    id: Uuid,
    org_id: String,
    shopify_customer_id: Option<String>,
    name: String,
    phone: Option<String>,
    shipping_addr_1: Option<String>,
    shipping_addr_2: Option<String>,
    postal_code: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            org_id: row.org_id,
            shopify_customer_id: row.shopify_customer_id,
            name: row.name,
            phone: row.phone,
            shipping_addr_1: row.shipping_addr_1,
            shipping_addr_2: row.shipping_addr_2,
            postal_code: row.postal_code,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) const CUSTOMER_COLUMNS: &str = "id, org_id, shopify_customer_id, name, phone, \
     shipping_addr_1, shipping_addr_2, postal_code, created_by, created_at, updated_at";

/// Input for creating a customer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub shopify_customer_id: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub shipping_addr_1: Option<String>,
    pub shipping_addr_2: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
}

/// Input for updating a customer; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCustomerInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub shopify_customer_id: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub shipping_addr_1: Option<String>,
    pub shipping_addr_2: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
}

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List customers, newest first
    pub async fn list(&self, tenant: &TenantContext) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE org_id = $1 ORDER BY created_at DESC",
            CUSTOMER_COLUMNS
        ))
        .bind(&tenant.org_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    /// Get a customer by ID
    pub async fn get(&self, tenant: &TenantContext, customer_id: Uuid) -> AppResult<Customer> {
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

    /// Create a customer
    pub async fn create(
        &self,
        tenant: &TenantContext,
        input: CreateCustomerInput,
    ) -> AppResult<Customer> {
        input.validate()?;
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "Customer name is required"));
        }

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            INSERT INTO customers (org_id, shopify_customer_id, name, phone,
                                   shipping_addr_1, shipping_addr_2, postal_code, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(&tenant.org_id)
        .bind(&input.shopify_customer_id)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.shipping_addr_1)
        .bind(&input.shipping_addr_2)
        .bind(&input.postal_code)
        .bind(&tenant.user_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(customer_id = %row.id, org_id = %tenant.org_id, "Customer created");
        Ok(row.into())
    }

    /// Update a customer
    pub async fn update(
        &self,
        tenant: &TenantContext,
        customer_id: Uuid,
        input: UpdateCustomerInput,
    ) -> AppResult<Customer> {
        input.validate()?;

        sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            UPDATE customers SET
                name = COALESCE($3, name),
                shopify_customer_id = COALESCE($4, shopify_customer_id),
                phone = COALESCE($5, phone),
                shipping_addr_1 = COALESCE($6, shipping_addr_1),
                shipping_addr_2 = COALESCE($7, shipping_addr_2),
                postal_code = COALESCE($8, postal_code),
                updated_at = NOW()
            WHERE id = $1 AND org_id = $2
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(customer_id)
        .bind(&tenant.org_id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.shopify_customer_id)
        .bind(&input.phone)
        .bind(&input.shipping_addr_1)
        .bind(&input.shipping_addr_2)
        .bind(&input.postal_code)
        .fetch_optional(&self.db)
        .await?
        .map(Customer::from)
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Delete a customer who has no orders
    pub async fn delete(&self, tenant: &TenantContext, customer_id: Uuid) -> AppResult<()> {
        let order_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE customer_id = $1 AND org_id = $2",
        )
        .bind(customer_id)
        .bind(&tenant.org_id)
        .fetch_one(&self.db)
        .await?;

        if order_count > 0 {
            return Err(AppError::Conflict {
                resource: "customer".to_string(),
                message: format!(
                    "Customer has {} order(s); delete or reassign them first",
                    order_count
                ),
            });
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND org_id = $2")
            .bind(customer_id)
            .bind(&tenant.org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        tracing::info!(%customer_id, org_id = %tenant.org_id, "Customer deleted");
        Ok(())
    }
}
