//! Retention plan execution.
//!
//! [`RetentionExecutor::apply`] is the orchestration entry point: list the
//! partitions, decide what to drop, then issue one `DROP TABLE` per
//! eligible partition, oldest first. Each drop is its own statement; no
//! transaction wraps the run, so a partial failure leaves the table in a
//! partially-pruned, still-valid state.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::retention::{
    DropFailure, PartitionCatalog, RetentionError, RetentionMode, RetentionPolicy,
    RetentionReport, RetentionResult, decide,
};

/// Executes DDL statements against the database.
///
/// A trait seam so executor behavior (partial failures, statement order)
/// is testable without Postgres.
#[async_trait]
pub trait DdlExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<(), sqlx::Error>;
}

/// [`DdlExecutor`] over a live connection pool.
pub struct PostgresDdlExecutor {
    pool: PgPool,
}

impl PostgresDdlExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DdlExecutor for PostgresDdlExecutor {
    async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }
}

/// Orchestrates one retention run for one table.
pub struct RetentionExecutor {
    catalog: Arc<dyn PartitionCatalog>,
    ddl: Arc<dyn DdlExecutor>,
}

impl RetentionExecutor {
    pub fn new(catalog: Arc<dyn PartitionCatalog>, ddl: Arc<dyn DdlExecutor>) -> Self {
        Self { catalog, ddl }
    }

    /// Apply `policy` as of `now`.
    ///
    /// Partition drops are issued sequentially, oldest first. A failed drop
    /// is recorded in the report and does not abort the remaining drops;
    /// if `drop_parent_after_prune` is set, the parent drop is still
    /// attempted afterwards. The caller always gets either a report
    /// (possibly with partial failures) or one error explaining why the
    /// run could not start.
    pub async fn apply(
        &self,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> RetentionResult<RetentionReport> {
        if !self
            .catalog
            .table_exists(policy.target_table(), policy.schema())
            .await?
        {
            return Err(RetentionError::TableNotFound {
                schema: policy.schema().to_string(),
                table: policy.target_table().to_string(),
            });
        }

        let partitions = self
            .catalog
            .list_partitions(
                policy.target_table(),
                policy.schema(),
                policy.partition_interval(),
            )
            .await?;

        let plan = decide(&partitions, policy, now)?;

        if plan.row_delete_required {
            // Condition-mode row deletion is a declared extension point.
            // Failing here is deliberate: dropping nothing while claiming
            // success would be worse than an explicit signal.
            if let RetentionMode::Condition { expression } = policy.mode() {
                tracing::warn!(
                    table = policy.target_table(),
                    condition = expression.as_str(),
                    "Condition-based row deletion requested but not implemented"
                );
            }
            return Err(RetentionError::ConditionDeleteUnimplemented);
        }

        let mut report = RetentionReport {
            dry_run: policy.dry_run(),
            ..Default::default()
        };

        tracing::info!(
            table = policy.target_table(),
            partitions = partitions.len(),
            eligible = plan.partitions_to_drop.len(),
            dry_run = policy.dry_run(),
            "Computed retention plan"
        );

        for partition in &plan.partitions_to_drop {
            let stmt = drop_table_stmt(policy.schema(), &partition.physical_name);

            if policy.dry_run() {
                tracing::info!(
                    partition = partition.physical_name.as_str(),
                    window_start = %partition.window_start,
                    "DRY RUN: would drop partition"
                );
                continue;
            }

            match self.ddl.execute(&stmt).await {
                Ok(()) => {
                    tracing::info!(
                        partition = partition.physical_name.as_str(),
                        window_start = %partition.window_start,
                        "Dropped partition"
                    );
                    report.dropped.push(partition.physical_name.clone());
                }
                Err(e) => {
                    tracing::warn!(
                        partition = partition.physical_name.as_str(),
                        error = %e,
                        "Failed to drop partition, continuing"
                    );
                    report.failed.push(DropFailure {
                        partition: partition.physical_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if plan.drop_parent {
            let stmt = drop_table_stmt(policy.schema(), policy.target_table());

            if policy.dry_run() {
                tracing::info!(
                    table = policy.target_table(),
                    "DRY RUN: would drop parent table"
                );
            } else {
                match self.ddl.execute(&stmt).await {
                    Ok(()) => {
                        tracing::info!(table = policy.target_table(), "Dropped parent table");
                        report.parent_dropped = true;
                    }
                    Err(e) => {
                        tracing::warn!(
                            table = policy.target_table(),
                            error = %e,
                            "Failed to drop parent table"
                        );
                        report.failed.push(DropFailure {
                            partition: policy.target_table().to_string(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(report)
    }
}

fn drop_table_stmt(schema: &str, table: &str) -> String {
    format!(
        "DROP TABLE IF EXISTS {}.{}",
        quote_ident(schema),
        quote_ident(table)
    )
}

/// Double-quote an identifier. Identifiers cannot be bind parameters, so
/// embedded quotes are doubled per the SQL standard.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
