//! Partition discovery against the Postgres system catalogs.
//!
//! The catalog is a trait seam so the executor can be exercised without a
//! live database; the real implementation queries `pg_inherits` for the
//! children of the parent table and maps each name through the parser.

use async_trait::async_trait;
use chrono::Duration;
use sqlx::{PgPool, Row};

use crate::retention::{PartitionDescriptor, RetentionResult};

/// Read-only view of a table's physical partitions.
#[async_trait]
pub trait PartitionCatalog: Send + Sync {
    /// Whether `schema.parent_table` exists at all.
    async fn table_exists(&self, parent_table: &str, schema: &str) -> RetentionResult<bool>;

    /// All physical partitions of `schema.parent_table`, each with its
    /// time window attached.
    ///
    /// Returns an empty vec (not an error) when the parent has no
    /// partitions yet. A partition name that does not match the naming
    /// convention fails the whole listing; a connectivity or permission
    /// failure surfaces as [`crate::retention::RetentionError::CatalogQuery`].
    async fn list_partitions(
        &self,
        parent_table: &str,
        schema: &str,
        interval: Duration,
    ) -> RetentionResult<Vec<PartitionDescriptor>>;
}

/// [`PartitionCatalog`] backed by the Postgres system catalogs.
pub struct PostgresPartitionCatalog {
    pool: PgPool,
}

impl PostgresPartitionCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PartitionCatalog for PostgresPartitionCatalog {
    async fn table_exists(&self, parent_table: &str, schema: &str) -> RetentionResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM information_schema.tables
                WHERE table_name = $1 AND table_schema = $2
            ) AS present
            "#,
        )
        .bind(parent_table)
        .bind(schema)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("present"))
    }

    async fn list_partitions(
        &self,
        parent_table: &str,
        schema: &str,
        interval: Duration,
    ) -> RetentionResult<Vec<PartitionDescriptor>> {
        let rows = sqlx::query(
            r#"
            SELECT child.relname AS partition_name
            FROM pg_inherits
            JOIN pg_class parent ON pg_inherits.inhparent = parent.oid
            JOIN pg_class child ON pg_inherits.inhrelid = child.oid
            JOIN pg_namespace ns ON parent.relnamespace = ns.oid
            WHERE parent.relname = $1 AND ns.nspname = $2
            ORDER BY child.relname
            "#,
        )
        .bind(parent_table)
        .bind(schema)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let name: String = row.get("partition_name");
                PartitionDescriptor::parse(&name, parent_table, interval)
            })
            .collect()
    }
}
