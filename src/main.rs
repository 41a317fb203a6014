use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pgprune::config::PruneConfig;
use pgprune::retention::{
    PostgresDdlExecutor, PostgresPartitionCatalog, RetentionExecutor, RetentionPolicy,
};

#[derive(Parser, Debug)]
#[command(version, about = "Prune aged-out partitions from range-partitioned tables")]
struct Args {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "pgprune.toml")]
    config: String,

    /// Run a single retention pass and exit instead of looping.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args).await {
        tracing::error!(error = %e, "pgprune failed");
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = PruneConfig::from_file(&args.config)?;

    // Policies are validated up front so a bad table entry fails the
    // process before any DDL is attempted anywhere.
    let policies: Vec<RetentionPolicy> = config
        .tables
        .iter()
        .map(|t| t.policy())
        .collect::<Result<_, _>>()?;

    let pool = pgprune::db::connect(&config.database).await?;
    let executor = RetentionExecutor::new(
        Arc::new(PostgresPartitionCatalog::new(pool.clone())),
        Arc::new(PostgresDdlExecutor::new(pool)),
    );

    if args.once {
        let failed = run_pass(&executor, &policies).await;
        if failed {
            return Err("one or more tables failed to prune".into());
        }
        return Ok(());
    }

    tracing::info!(
        interval_secs = config.interval_secs,
        tables = policies.len(),
        "Starting prune loop"
    );
    loop {
        run_pass(&executor, &policies).await;
        tokio::time::sleep(config.interval()).await;
    }
}

/// Run one retention pass over every configured table, continuing past
/// per-table failures. Returns true if any table failed.
async fn run_pass(executor: &RetentionExecutor, policies: &[RetentionPolicy]) -> bool {
    let mut any_failed = false;

    for policy in policies {
        match executor.apply(policy, Utc::now()).await {
            Ok(report) => {
                tracing::info!(
                    table = policy.target_table(),
                    dropped = report.dropped_count(),
                    failed = report.failed_count(),
                    parent_dropped = report.parent_dropped,
                    dry_run = report.dry_run,
                    "Retention run complete"
                );
                if report.has_failures() {
                    any_failed = true;
                }
            }
            Err(e) => {
                tracing::error!(
                    table = policy.target_table(),
                    error = %e,
                    "Retention run aborted"
                );
                any_failed = true;
            }
        }
    }

    any_failed
}
