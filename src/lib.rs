//! `pgprune` — time-based retention for range-partitioned PostgreSQL tables.
//!
//! An external partition manager buckets inserts into fixed-width time
//! partitions named `<parent>_p<YYYYMMDD_HHMMSS>`. This crate periodically
//! removes the partitions whose data has aged past a configured threshold,
//! deciding eligibility purely from the name-encoded time window.

pub mod config;
pub mod db;
pub mod retention;

pub use config::{PruneConfig, TableRetentionConfig};
pub use retention::{
    PartitionCatalog, PartitionDescriptor, PostgresDdlExecutor, PostgresPartitionCatalog,
    RetentionError, RetentionExecutor, RetentionMode, RetentionPlan, RetentionPolicy,
    RetentionReport,
};
