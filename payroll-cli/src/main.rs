use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use payroll_core::db::DbConfig;

mod app;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Take-home pay and income tax estimator for the payroll database.
///
/// Connects to the configured database, loads the employee's salary and
/// bonus records plus the requested tax regime, and prints the current and
/// next-month take-home projection.
#[derive(Debug, Parser)]
struct Cli {
    /// Database backend to use.
    #[arg(long, default_value = "sqlite")]
    backend: String,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `payroll.db`) or `:memory:`.
    #[arg(long, default_value = "payroll.db")]
    db: String,

    /// Employee id to project.
    #[arg(long)]
    employee: i64,

    /// Tax regime code to apply.
    #[arg(long, default_value = "new")]
    regime: String,

    /// Reference instant (RFC 3339) used to decide which bonuses belong to
    /// the current month. Defaults to the current time.
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let now = cli.at.unwrap_or_else(Utc::now);

    let db_config = DbConfig {
        backend: cli.backend,
        connection_string: cli.db,
    };

    debug!("connecting to {} backend", db_config.backend);
    let registry = app::build_registry();
    let repo = registry.create(&db_config).await?;

    let report = app::project_for_employee(&*repo, cli.employee, &cli.regime, now).await?;
    println!("{}", report);

    Ok(())
}
