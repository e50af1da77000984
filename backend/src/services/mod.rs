//! Business logic services for the Breastmilk Processing Operations Platform

pub mod customer;
pub mod dashboard;
pub mod machine_run;
pub mod order;
pub mod retry;

pub use customer::CustomerService;
pub use dashboard::DashboardService;
pub use machine_run::MachineRunService;
pub use order::OrderService;

/// Read a status column, falling back to the default for text we don't know.
pub(crate) fn stored_status<S>(record_id: uuid::Uuid, text: &str) -> S
where
    S: std::str::FromStr<Err = String> + Default,
{
    text.parse().unwrap_or_else(|e| {
        tracing::warn!("Record {} has unreadable status, using default: {}", record_id, e);
        S::default()
    })
}
