//! Machine run service
//!
//! A run is saved as one multi-table write: the run row, its individual bags
//! and its cross-checks commit together or not at all.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    compute_run_summary, parse_bag_date, parse_qty, try_parse_qty, validate_individual_bags,
    validate_run_identity, CrossCheck, CrossCheckEntry, IndividualBag, MachineRun,
    MachineRunStatus, MachineRunWithDetails, RunInputs, RunSummary,
};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::config::RetryConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::TenantContext;

use super::retry::with_retry;
use super::stored_status;

/// Machine run service
#[derive(Clone)]
pub struct MachineRunService {
    db: PgPool,
    retry: RetryConfig,
    tolerance: Decimal,
}

/// Database row for a machine run
#[derive(Debug, sqlx::FromRow)]
struct MachineRunRow {
    id: Uuid,
    org_id: String,
    order_id: Uuid,
    run_number: i32,
    status: String,
    mama_name: String,
    mama_nric: String,
    date_received: Option<NaiveDate>,
    date_processed: Option<NaiveDate>,
    date_packed: Option<NaiveDate>,
    bags_weight_g: Option<Decimal>,
    powder_weight_g: Option<Decimal>,
    packing_requirements_ml: Option<Decimal>,
    label_water_to_add_ml: Option<Decimal>,
    water_activity_level: Option<Decimal>,
    gram_ratio_staff_input_ml: Option<Decimal>,
    handled_by: Option<String>,
    verified_by: Option<String>,
    remarks: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MachineRunRow> for MachineRun {
    fn from(row: MachineRunRow) -> Self {
        MachineRun {
            id: row.id,
            org_id: row.org_id,
            order_id: row.order_id,
            run_number: row.run_number,
            status: stored_status(row.id, &row.status),
            mama_name: row.mama_name,
            mama_nric: row.mama_nric,
            date_received: row.date_received,
            date_processed: row.date_processed,
            date_packed: row.date_packed,
            bags_weight_g: row.bags_weight_g,
            powder_weight_g: row.powder_weight_g,
            packing_requirements_ml: row.packing_requirements_ml,
            label_water_to_add_ml: row.label_water_to_add_ml,
            water_activity_level: row.water_activity_level,
            gram_ratio_staff_input_ml: row.gram_ratio_staff_input_ml,
            handled_by: row.handled_by,
            verified_by: row.verified_by,
            remarks: row.remarks,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct IndividualBagRow {
    id: Uuid,
    machine_run_id: Uuid,
    bag_number: i32,
    date_expressed: Option<NaiveDate>,
    weight_g: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<IndividualBagRow> for IndividualBag {
    fn from(row: IndividualBagRow) -> Self {
        IndividualBag {
            id: row.id,
            machine_run_id: row.machine_run_id,
            bag_number: row.bag_number,
            date_expressed: row.date_expressed,
            weight_g: row.weight_g,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CrossCheckRow {
    id: Uuid,
    machine_run_id: Uuid,
    check_number: i32,
    powder_weight_g: Decimal,
    quantity: Decimal,
    created_at: DateTime<Utc>,
}

impl From<CrossCheckRow> for CrossCheck {
    fn from(row: CrossCheckRow) -> Self {
        CrossCheck {
            id: row.id,
            machine_run_id: row.machine_run_id,
            check_number: row.check_number,
            powder_weight_g: row.powder_weight_g,
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

const RUN_COLUMNS: &str = "id, org_id, order_id, run_number, status, mama_name, mama_nric, \
     date_received, date_processed, date_packed, bags_weight_g, powder_weight_g, \
     packing_requirements_ml, label_water_to_add_ml, water_activity_level, \
     gram_ratio_staff_input_ml, handled_by, verified_by, remarks, created_by, \
     created_at, updated_at";

/// Wizard submission: identity, bags, calculation inputs and cross-checks
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveMachineRunInput {
    #[validate(length(max = 200))]
    pub mama_name: String,
    #[validate(length(max = 50))]
    pub mama_nric: String,
    /// Date the expressed milk was received
    pub date_received: Option<NaiveDate>,
    pub date_processed: Option<NaiveDate>,
    pub date_packed: Option<NaiveDate>,
    #[validate(length(max = 200))]
    pub handled_by: Option<String>,
    #[validate(length(max = 200))]
    pub verified_by: Option<String>,
    pub remarks: Option<String>,
    #[serde(default)]
    pub inputs: RunInputs,
    #[serde(default)]
    pub cross_checks: Vec<CrossCheckEntry>,
}

/// Input for changing a run's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: MachineRunStatus,
}

/// Unsaved form snapshot for live calculation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewInput {
    pub inputs: RunInputs,
    pub cross_checks: Vec<CrossCheckEntry>,
}

/// A submission converted to column values
#[derive(Debug, PartialEq)]
struct PreparedRun {
    bags_weight_g: Option<Decimal>,
    powder_weight_g: Option<Decimal>,
    packing_requirements_ml: Option<Decimal>,
    label_water_to_add_ml: Option<Decimal>,
    water_activity_level: Option<Decimal>,
    gram_ratio_staff_input_ml: Option<Decimal>,
    bags: Vec<PreparedBag>,
    cross_checks: Vec<(Decimal, Decimal)>,
}

#[derive(Debug, PartialEq)]
struct PreparedBag {
    date_expressed: NaiveDate,
    weight_g: Option<Decimal>,
}

/// Check the wizard gates and convert form text to column values
fn prepare(input: &SaveMachineRunInput) -> AppResult<PreparedRun> {
    input.validate()?;
    validate_run_identity(&input.mama_name, &input.mama_nric, input.date_received)
        .map_err(|msg| AppError::validation("identity", msg))?;
    validate_individual_bags(&input.inputs.bags).map_err(|msg| AppError::validation("bags", msg))?;

    let bags = input
        .inputs
        .bags
        .iter()
        .map(|bag| {
            Ok(PreparedBag {
                date_expressed: parse_bag_date(&bag.date)
                    .map_err(|msg| AppError::validation("bags", msg))?,
                weight_g: try_parse_qty(&bag.weight),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    // Rows left entirely blank are not weigh-ins
    let cross_checks = input
        .cross_checks
        .iter()
        .filter(|c| !(c.powder_weight.trim().is_empty() && c.quantity.trim().is_empty()))
        .map(|c| (parse_qty(&c.powder_weight), parse_qty(&c.quantity)))
        .collect();

    let inputs = &input.inputs;
    Ok(PreparedRun {
        bags_weight_g: try_parse_qty(&inputs.bags_weight),
        powder_weight_g: try_parse_qty(&inputs.powder_weight),
        packing_requirements_ml: try_parse_qty(&inputs.packing_requirements),
        label_water_to_add_ml: try_parse_qty(&inputs.water_to_add),
        water_activity_level: try_parse_qty(&inputs.water_activity_level),
        gram_ratio_staff_input_ml: try_parse_qty(&inputs.gram_ratio_staff_input),
        bags,
        cross_checks,
    })
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Insert bags numbered 1..n and cross-checks in entry order
async fn insert_children(
    conn: &mut PgConnection,
    run_id: Uuid,
    prepared: &PreparedRun,
) -> Result<(), sqlx::Error> {
    for (index, bag) in prepared.bags.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO individual_bags (machine_run_id, bag_number, date_expressed, weight_g)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(run_id)
        .bind(index as i32 + 1)
        .bind(bag.date_expressed)
        .bind(bag.weight_g)
        .execute(&mut *conn)
        .await?;
    }

    for (index, (powder_weight_g, quantity)) in prepared.cross_checks.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO cross_checks (machine_run_id, check_number, powder_weight_g, quantity)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(run_id)
        .bind(index as i32 + 1)
        .bind(powder_weight_g)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

impl MachineRunService {
    /// Create a new MachineRunService instance
    pub fn new(db: PgPool, retry: RetryConfig, tolerance: Decimal) -> Self {
        Self {
            db,
            retry,
            tolerance,
        }
    }

    /// List an order's runs by run number
    pub async fn list_by_order(
        &self,
        tenant: &TenantContext,
        order_id: Uuid,
    ) -> AppResult<Vec<MachineRun>> {
        let order_exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE id = $1 AND org_id = $2",
        )
        .bind(order_id)
        .bind(&tenant.org_id)
        .fetch_one(&self.db)
        .await?;

        if order_exists == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        let rows = sqlx::query_as::<_, MachineRunRow>(&format!(
            "SELECT {} FROM machine_runs WHERE order_id = $1 AND org_id = $2 ORDER BY run_number",
            RUN_COLUMNS
        ))
        .bind(order_id)
        .bind(&tenant.org_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(MachineRun::from).collect())
    }

    /// Get a run with its bags and cross-checks
    pub async fn get(
        &self,
        tenant: &TenantContext,
        run_id: Uuid,
    ) -> AppResult<MachineRunWithDetails> {
        let run: MachineRun = sqlx::query_as::<_, MachineRunRow>(&format!(
            "SELECT {} FROM machine_runs WHERE id = $1 AND org_id = $2",
            RUN_COLUMNS
        ))
        .bind(run_id)
        .bind(&tenant.org_id)
        .fetch_optional(&self.db)
        .await?
        .map(MachineRun::from)
        .ok_or_else(|| AppError::NotFound("Machine run".to_string()))?;

        let individual_bags = sqlx::query_as::<_, IndividualBagRow>(
            r#"
            SELECT id, machine_run_id, bag_number, date_expressed, weight_g, created_at, updated_at
            FROM individual_bags
            WHERE machine_run_id = $1
            ORDER BY bag_number
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(IndividualBag::from)
        .collect();

        let cross_checks = sqlx::query_as::<_, CrossCheckRow>(
            r#"
            SELECT id, machine_run_id, check_number, powder_weight_g, quantity, created_at
            FROM cross_checks
            WHERE machine_run_id = $1
            ORDER BY check_number
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(CrossCheck::from)
        .collect();

        Ok(MachineRunWithDetails {
            run,
            individual_bags,
            cross_checks,
        })
    }

    /// Save a new run for an order, numbered after the order's last run
    pub async fn create(
        &self,
        tenant: &TenantContext,
        order_id: Uuid,
        input: SaveMachineRunInput,
    ) -> AppResult<MachineRunWithDetails> {
        let prepared = prepare(&input)?;
        let (input, prepared) = (&input, &prepared);

        // Fixed across attempts so a retry can see a commit that already landed
        let run_id = Uuid::new_v4();

        let saved = with_retry(&self.retry, "Saving machine run", || async move {
            let mut tx = self.db.begin().await?;

            // Locks the order so concurrent saves number runs one after another
            let order = sqlx::query_scalar::<_, Uuid>(
                "SELECT id FROM orders WHERE id = $1 AND org_id = $2 FOR UPDATE",
            )
            .bind(order_id)
            .bind(&tenant.org_id)
            .fetch_optional(&mut *tx)
            .await?;

            if order.is_none() {
                return Ok(None);
            }

            let existing = sqlx::query_scalar::<_, i32>(
                "SELECT run_number FROM machine_runs WHERE id = $1 AND org_id = $2",
            )
            .bind(run_id)
            .bind(&tenant.org_id)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(run_number) = existing {
                tracing::info!(%run_id, "Machine run already saved by an earlier attempt");
                return Ok(Some(run_number));
            }

            let run_number = sqlx::query_scalar::<_, i32>(
                "SELECT COALESCE(MAX(run_number), 0) + 1 FROM machine_runs WHERE order_id = $1",
            )
            .bind(order_id)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO machine_runs (id, org_id, order_id, run_number, status, mama_name, mama_nric,
                                          date_received, date_processed, date_packed,
                                          bags_weight_g, powder_weight_g, packing_requirements_ml,
                                          label_water_to_add_ml, water_activity_level,
                                          gram_ratio_staff_input_ml, handled_by, verified_by,
                                          remarks, created_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
                "#,
            )
            .bind(run_id)
            .bind(&tenant.org_id)
            .bind(order_id)
            .bind(run_number)
            .bind(MachineRunStatus::Pending.as_str())
            .bind(input.mama_name.trim())
            .bind(input.mama_nric.trim())
            .bind(input.date_received)
            .bind(input.date_processed)
            .bind(input.date_packed)
            .bind(prepared.bags_weight_g)
            .bind(prepared.powder_weight_g)
            .bind(prepared.packing_requirements_ml)
            .bind(prepared.label_water_to_add_ml)
            .bind(prepared.water_activity_level)
            .bind(prepared.gram_ratio_staff_input_ml)
            .bind(trimmed(&input.handled_by))
            .bind(trimmed(&input.verified_by))
            .bind(trimmed(&input.remarks))
            .bind(&tenant.user_id)
            .execute(&mut *tx)
            .await?;

            insert_children(&mut tx, run_id, prepared).await?;
            tx.commit().await?;

            Ok::<_, sqlx::Error>(Some(run_number))
        })
        .await?;

        let run_number = saved.ok_or_else(|| AppError::NotFound("Order".to_string()))?;
        tracing::info!(%run_id, %order_id, run_number, "Machine run created");

        self.verify_saved(tenant, run_id, prepared).await
    }

    /// Replace a run's inputs, bags and cross-checks
    pub async fn update(
        &self,
        tenant: &TenantContext,
        run_id: Uuid,
        input: SaveMachineRunInput,
    ) -> AppResult<MachineRunWithDetails> {
        let prepared = prepare(&input)?;
        let (input, prepared) = (&input, &prepared);

        let updated = with_retry(&self.retry, "Updating machine run", || async move {
            let mut tx = self.db.begin().await?;

            let updated = sqlx::query_scalar::<_, Uuid>(
                r#"
                UPDATE machine_runs SET
                    mama_name = $3,
                    mama_nric = $4,
                    date_received = $5,
                    date_processed = $6,
                    date_packed = $7,
                    bags_weight_g = $8,
                    powder_weight_g = $9,
                    packing_requirements_ml = $10,
                    label_water_to_add_ml = $11,
                    water_activity_level = $12,
                    gram_ratio_staff_input_ml = $13,
                    handled_by = $14,
                    verified_by = $15,
                    remarks = $16,
                    updated_at = NOW()
                WHERE id = $1 AND org_id = $2
                RETURNING id
                "#,
            )
            .bind(run_id)
            .bind(&tenant.org_id)
            .bind(input.mama_name.trim())
            .bind(input.mama_nric.trim())
            .bind(input.date_received)
            .bind(input.date_processed)
            .bind(input.date_packed)
            .bind(prepared.bags_weight_g)
            .bind(prepared.powder_weight_g)
            .bind(prepared.packing_requirements_ml)
            .bind(prepared.label_water_to_add_ml)
            .bind(prepared.water_activity_level)
            .bind(prepared.gram_ratio_staff_input_ml)
            .bind(trimmed(&input.handled_by))
            .bind(trimmed(&input.verified_by))
            .bind(trimmed(&input.remarks))
            .fetch_optional(&mut *tx)
            .await?;

            if updated.is_none() {
                return Ok(false);
            }

            sqlx::query("DELETE FROM individual_bags WHERE machine_run_id = $1")
                .bind(run_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM cross_checks WHERE machine_run_id = $1")
                .bind(run_id)
                .execute(&mut *tx)
                .await?;

            insert_children(&mut tx, run_id, prepared).await?;
            tx.commit().await?;

            Ok::<_, sqlx::Error>(true)
        })
        .await?;

        if !updated {
            return Err(AppError::NotFound("Machine run".to_string()));
        }
        tracing::info!(%run_id, "Machine run updated");

        self.verify_saved(tenant, run_id, prepared).await
    }

    /// Change a run's status
    pub async fn update_status(
        &self,
        tenant: &TenantContext,
        run_id: Uuid,
        status: MachineRunStatus,
    ) -> AppResult<MachineRun> {
        let run = sqlx::query_as::<_, MachineRunRow>(&format!(
            r#"
            UPDATE machine_runs SET status = $3, updated_at = NOW()
            WHERE id = $1 AND org_id = $2
            RETURNING {}
            "#,
            RUN_COLUMNS
        ))
        .bind(run_id)
        .bind(&tenant.org_id)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await?
        .map(MachineRun::from)
        .ok_or_else(|| AppError::NotFound("Machine run".to_string()))?;

        tracing::info!(%run_id, %status, "Machine run status updated");
        Ok(run)
    }

    /// Delete a run; bags and cross-checks go with it
    pub async fn delete(&self, tenant: &TenantContext, run_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM machine_runs WHERE id = $1 AND org_id = $2")
            .bind(run_id)
            .bind(&tenant.org_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Machine run".to_string()));
        }

        tracing::info!(%run_id, "Machine run deleted");
        Ok(())
    }

    /// Derived outputs for a saved run
    pub async fn summary(&self, tenant: &TenantContext, run_id: Uuid) -> AppResult<RunSummary> {
        let run = self.get(tenant, run_id).await?;
        let summary = self.summarize(&run);
        tracing::debug!(%run_id, warnings = summary.has_warnings(), "Computed run summary");
        Ok(summary)
    }

    /// Derived outputs for an unsaved form snapshot
    pub fn preview(&self, input: &PreviewInput) -> RunSummary {
        compute_run_summary(&input.inputs, &input.cross_checks, self.tolerance)
    }

    fn summarize(&self, run: &MachineRunWithDetails) -> RunSummary {
        compute_run_summary(&run.to_run_inputs(), &run.cross_check_entries(), self.tolerance)
    }

    /// Re-read a saved run and confirm every child row landed
    async fn verify_saved(
        &self,
        tenant: &TenantContext,
        run_id: Uuid,
        prepared: &PreparedRun,
    ) -> AppResult<MachineRunWithDetails> {
        let run = self.get(tenant, run_id).await?;

        if run.individual_bags.len() != prepared.bags.len()
            || run.cross_checks.len() != prepared.cross_checks.len()
        {
            return Err(AppError::Internal(format!(
                "Machine run {} saved incompletely: expected {} bags and {} cross-checks, found {} and {}",
                run_id,
                prepared.bags.len(),
                prepared.cross_checks.len(),
                run.individual_bags.len(),
                run.cross_checks.len()
            )));
        }

        if !run.cross_checks.is_empty() {
            let summary = self.summarize(&run);
            if !summary.cross_check.is_within_tolerance {
                tracing::warn!(
                    %run_id,
                    variance_pct = %summary.cross_check.variance_pct,
                    "Cross-check outside tolerance"
                );
            }
        }

        Ok(run)
    }
}
