//! Retention engine for range-partitioned tables.
//!
//! The engine models a retention policy, discovers a table's physical
//! partitions, derives each partition's time window from its name, and
//! drops the partitions whose data has aged past the retention cutoff.
//! Partition creation and scheduling live outside this crate; the only
//! entry point is [`RetentionExecutor::apply`].

mod catalog;
mod decider;
mod executor;
mod partition;
mod policy;

pub use catalog::{PartitionCatalog, PostgresPartitionCatalog};
pub use decider::{RetentionPlan, decide};
pub use executor::{DdlExecutor, PostgresDdlExecutor, RetentionExecutor};
pub use partition::{NAME_TIMESTAMP_FORMAT, PartitionDescriptor};
pub use policy::{RetentionMode, RetentionPolicy};

use thiserror::Error;

/// Errors that abort a retention run before (or instead of) producing a
/// report. Per-partition drop failures are not here: those are recorded in
/// the [`RetentionReport`] and the run continues.
#[derive(Debug, Error)]
pub enum RetentionError {
    /// Invalid policy; the run never starts.
    #[error("Invalid retention policy: {0}")]
    Configuration(String),

    /// A partition name did not match `<parent>_pYYYYMMDD_HHMMSS`.
    /// This always propagates. A silently skipped partition can neither be
    /// pruned nor counted, leaking storage.
    #[error("Partition name {name:?} does not match the {parent}_pYYYYMMDD_HHMMSS naming convention")]
    UnparsablePartitionName { name: String, parent: String },

    /// The partition list could not be read; nothing can be decided.
    #[error("Catalog query failed: {0}")]
    CatalogQuery(#[from] sqlx::Error),

    /// The configured parent table does not exist.
    #[error("Table {schema}.{table} does not exist")]
    TableNotFound { schema: String, table: String },

    /// Two sibling partitions cover overlapping time windows. This is an
    /// upstream naming-convention violation and is never resolved by
    /// guessing an order.
    #[error("Partitions {first} and {second} cover overlapping time windows")]
    OverlappingWindows { first: String, second: String },

    /// Condition-mode row deletion is a declared extension point with no
    /// implementation yet.
    #[error("Condition-based row deletion is not implemented")]
    ConditionDeleteUnimplemented,
}

pub type RetentionResult<T> = Result<T, RetentionError>;

/// Outcome of a single retention run.
#[derive(Debug, Default)]
pub struct RetentionReport {
    /// Names of partitions dropped, in drop order (oldest first).
    pub dropped: Vec<String>,
    /// Per-partition drop failures. The run continues past these.
    pub failed: Vec<DropFailure>,
    /// Whether the parent table itself was dropped.
    pub parent_dropped: bool,
    /// Whether this run was a dry run (no DDL issued).
    pub dry_run: bool,
}

/// A drop statement that failed, recorded instead of aborting the run.
#[derive(Debug)]
pub struct DropFailure {
    pub partition: String,
    pub error: String,
}

impl RetentionReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
