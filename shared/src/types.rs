//! Common types used across the platform

use serde::{Deserialize, Serialize};

use crate::models::{MachineRunStatus, OrderStatus};

/// Number of records in one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: i64,
}

/// Organization-wide counters for the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub orders_by_status: Vec<StatusCount<OrderStatus>>,
    pub machine_runs_by_status: Vec<StatusCount<MachineRunStatus>>,
    pub total_orders: i64,
    pub total_machine_runs: i64,
    pub total_bags: i64,
}

impl DashboardStats {
    /// Assemble stats from per-status counts, listing every status (zero when absent)
    pub fn from_counts(
        order_counts: &[(OrderStatus, i64)],
        run_counts: &[(MachineRunStatus, i64)],
        total_bags: i64,
    ) -> Self {
        let orders_by_status: Vec<_> = OrderStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: count_for(order_counts, status),
            })
            .collect();
        let machine_runs_by_status: Vec<_> = MachineRunStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: count_for(run_counts, status),
            })
            .collect();

        Self {
            total_orders: orders_by_status.iter().map(|c| c.count).sum(),
            total_machine_runs: machine_runs_by_status.iter().map(|c| c.count).sum(),
            orders_by_status,
            machine_runs_by_status,
            total_bags,
        }
    }
}

fn count_for<S: PartialEq + Copy>(counts: &[(S, i64)], status: S) -> i64 {
    counts
        .iter()
        .filter(|(s, _)| *s == status)
        .map(|(_, count)| count)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_stats_fills_missing_statuses() {
        let stats = DashboardStats::from_counts(
            &[(OrderStatus::Pending, 4), (OrderStatus::Completed, 2)],
            &[(MachineRunStatus::QaFailed, 1)],
            37,
        );

        assert_eq!(stats.orders_by_status.len(), 3);
        assert_eq!(stats.orders_by_status[1].count, 0);
        assert_eq!(stats.total_orders, 6);
        assert_eq!(stats.machine_runs_by_status.len(), 6);
        assert_eq!(stats.total_machine_runs, 1);
        assert_eq!(stats.total_bags, 37);
    }
}
