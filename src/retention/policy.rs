//! Retention policy value objects.
//!
//! A [`RetentionPolicy`] describes how long a table's data must be kept and
//! how removal happens: either by dropping whole time partitions
//! (`TimeWindow`) or by deleting rows matching a SQL predicate (`Condition`,
//! currently a stub). Policies are validated at construction and immutable
//! afterwards; a new run takes a new policy.

use chrono::Duration;

use crate::retention::{RetentionError, RetentionResult};

/// How eligibility for removal is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetentionMode {
    /// Drop whole partitions whose time window has aged past the retention
    /// cutoff. Eligibility is decided from partition names, never row scans.
    TimeWindow,

    /// Delete individual rows matching a boolean SQL predicate.
    ///
    /// Execution of this mode is not implemented; the executor fails
    /// explicitly rather than silently doing nothing.
    Condition {
        /// Boolean SQL predicate identifying rows to delete.
        expression: String,
    },
}

impl RetentionMode {
    /// Whether this mode requires row-level deletion instead of
    /// partition drops.
    pub fn is_condition(&self) -> bool {
        matches!(self, RetentionMode::Condition { .. })
    }
}

/// Immutable description of one table's retention behavior.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    target_table: String,
    schema: String,
    mode: RetentionMode,
    retention: Duration,
    partition_interval: Duration,
    drop_parent_after_prune: bool,
    dry_run: bool,
}

impl RetentionPolicy {
    /// Build a validated policy.
    ///
    /// Fails with [`RetentionError::Configuration`] if either duration is
    /// non-positive or a condition-mode predicate is blank.
    /// `drop_parent_after_prune` and `dry_run` start out false; enable them
    /// with the consuming setters before first use.
    pub fn new(
        target_table: impl Into<String>,
        schema: impl Into<String>,
        mode: RetentionMode,
        retention: Duration,
        partition_interval: Duration,
    ) -> RetentionResult<Self> {
        let target_table = target_table.into();
        let schema = schema.into();

        if target_table.is_empty() {
            return Err(RetentionError::Configuration(
                "target table name cannot be empty".into(),
            ));
        }
        if schema.is_empty() {
            return Err(RetentionError::Configuration(
                "schema name cannot be empty".into(),
            ));
        }
        if retention <= Duration::zero() {
            return Err(RetentionError::Configuration(format!(
                "retention duration must be positive, got {}s",
                retention.num_seconds()
            )));
        }
        if partition_interval <= Duration::zero() {
            return Err(RetentionError::Configuration(format!(
                "partition interval must be positive, got {}s",
                partition_interval.num_seconds()
            )));
        }
        if let RetentionMode::Condition { expression } = &mode
            && expression.trim().is_empty()
        {
            return Err(RetentionError::Configuration(
                "condition mode requires a non-empty predicate expression".into(),
            ));
        }

        Ok(Self {
            target_table,
            schema,
            mode,
            retention,
            partition_interval,
            drop_parent_after_prune: false,
            dry_run: false,
        })
    }

    /// Also drop the parent table once eligible partitions are removed.
    ///
    /// Destructive beyond retention semantics; off unless explicitly
    /// enabled (the demo configuration turns it on).
    pub fn with_drop_parent_after_prune(mut self, drop_parent: bool) -> Self {
        self.drop_parent_after_prune = drop_parent;
        self
    }

    /// Log the plan without issuing any DDL.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Logical (parent) table this policy applies to.
    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    /// Schema qualifying the parent table and its partitions.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn mode(&self) -> &RetentionMode {
        &self.mode
    }

    /// Maximum age of data that must be retained.
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Width of one partition's time window.
    pub fn partition_interval(&self) -> Duration {
        self.partition_interval
    }

    pub fn drop_parent_after_prune(&self) -> bool {
        self.drop_parent_after_prune
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
