//! Per-table retention configuration.
//!
//! Each `[[tables]]` entry describes one partitioned table and how long its
//! data is kept.
//!
//! # Example
//!
//! ```toml
//! [[tables]]
//! table = "test_table1"
//! schema = "public"
//! mode = "time_window"
//! retention_secs = 15
//! partition_interval_secs = 1
//! drop_parent_after_prune = true
//! dry_run = false
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::retention::{RetentionMode, RetentionPolicy};

/// How eligibility for removal is computed (config-level tag).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionModeConfig {
    /// Drop whole partitions whose time window aged out.
    #[default]
    TimeWindow,
    /// Delete rows matching `condition_expression` (not implemented).
    Condition,
}

/// Retention settings for one partitioned table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableRetentionConfig {
    /// Logical (parent) table to prune.
    pub table: String,

    /// Schema the table lives in.
    /// Default: "public"
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Eligibility mode.
    /// Default: time_window
    #[serde(default)]
    pub mode: RetentionModeConfig,

    /// Boolean SQL predicate for condition mode. Required when
    /// `mode = "condition"`, ignored otherwise.
    #[serde(default)]
    pub condition_expression: Option<String>,

    /// Seconds of data to keep; partitions ending before
    /// `now - retention_secs` are dropped.
    pub retention_secs: u64,

    /// Width of one partition window in seconds.
    /// Default: 1 (the demo's cadence)
    #[serde(default = "default_partition_interval_secs")]
    pub partition_interval_secs: u64,

    /// Drop the parent table itself after pruning its partitions.
    /// Destructive beyond retention semantics; off by default, the demo
    /// configuration enables it explicitly.
    #[serde(default)]
    pub drop_parent_after_prune: bool,

    /// Log the plan without executing any DDL.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_schema() -> String {
    "public".into()
}

fn default_partition_interval_secs() -> u64 {
    1
}

impl TableRetentionConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        // Policy construction performs the full check; surface its message.
        self.policy()
            .map(|_| ())
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// Build the immutable domain policy from this config section.
    pub fn policy(&self) -> Result<RetentionPolicy, crate::retention::RetentionError> {
        let mode = match self.mode {
            RetentionModeConfig::TimeWindow => RetentionMode::TimeWindow,
            RetentionModeConfig::Condition => RetentionMode::Condition {
                expression: self.condition_expression.clone().unwrap_or_default(),
            },
        };

        let policy = RetentionPolicy::new(
            self.table.clone(),
            self.schema.clone(),
            mode,
            Duration::seconds(self.retention_secs as i64),
            Duration::seconds(self.partition_interval_secs as i64),
        )?;

        Ok(policy
            .with_drop_parent_after_prune(self.drop_parent_after_prune)
            .with_dry_run(self.dry_run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: TableRetentionConfig = toml::from_str(
            r#"
            table = "test_table1"
            retention_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.schema, "public");
        assert_eq!(config.mode, RetentionModeConfig::TimeWindow);
        assert_eq!(config.partition_interval_secs, 1);
        assert!(!config.drop_parent_after_prune);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_full_config_to_policy() {
        let config: TableRetentionConfig = toml::from_str(
            r#"
            table = "test_table1"
            schema = "demo"
            mode = "time_window"
            retention_secs = 15
            partition_interval_secs = 1
            drop_parent_after_prune = true
            dry_run = true
            "#,
        )
        .unwrap();
        let policy = config.policy().unwrap();
        assert_eq!(policy.target_table(), "test_table1");
        assert_eq!(policy.schema(), "demo");
        assert_eq!(policy.retention(), Duration::seconds(15));
        assert!(policy.drop_parent_after_prune());
        assert!(policy.dry_run());
    }

    #[test]
    fn test_condition_mode_requires_expression() {
        let config: TableRetentionConfig = toml::from_str(
            r#"
            table = "test_table1"
            mode = "condition"
            retention_secs = 15
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_condition_mode_with_expression() {
        let config: TableRetentionConfig = toml::from_str(
            r#"
            table = "test_table1"
            mode = "condition"
            condition_expression = "mtime < now() - interval '15 seconds'"
            retention_secs = 15
            "#,
        )
        .unwrap();
        let policy = config.policy().unwrap();
        assert!(policy.mode().is_condition());
    }

    #[test]
    fn test_zero_retention_rejected() {
        let config: TableRetentionConfig = toml::from_str(
            r#"
            table = "test_table1"
            retention_secs = 0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
