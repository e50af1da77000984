//! Dashboard statistics service

use shared::{DashboardStats, MachineRunStatus, OrderStatus};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::middleware::TenantContext;

/// Dashboard service for organization-wide counters
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Orders and machine runs by status, and the number of bags logged
    pub async fn stats(&self, tenant: &TenantContext) -> AppResult<DashboardStats> {
        let order_rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM orders WHERE org_id = $1 GROUP BY status",
        )
        .bind(&tenant.org_id)
        .fetch_all(&self.db)
        .await?;

        let run_rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM machine_runs WHERE org_id = $1 GROUP BY status",
        )
        .bind(&tenant.org_id)
        .fetch_all(&self.db)
        .await?;

        let total_bags = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM individual_bags b
            JOIN machine_runs r ON r.id = b.machine_run_id
            WHERE r.org_id = $1
            "#,
        )
        .bind(&tenant.org_id)
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardStats::from_counts(
            &parse_counts::<OrderStatus>(order_rows),
            &parse_counts::<MachineRunStatus>(run_rows),
            total_bags,
        ))
    }
}

/// Keep counts for known statuses, logging any the database holds that we don't
fn parse_counts<S: std::str::FromStr<Err = String>>(rows: Vec<(String, i64)>) -> Vec<(S, i64)> {
    rows.into_iter()
        .filter_map(|(status, count)| match status.parse::<S>() {
            Ok(status) => Some((status, count)),
            Err(e) => {
                tracing::warn!("Skipping {} records: {}", count, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counts_skips_unknown_statuses() {
        let counts = parse_counts::<OrderStatus>(vec![
            ("pending".to_string(), 3),
            ("archived".to_string(), 9),
            ("completed".to_string(), 1),
        ]);

        assert_eq!(
            counts,
            vec![(OrderStatus::Pending, 3), (OrderStatus::Completed, 1)]
        );
    }
}
