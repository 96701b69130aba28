//! query-smoke: run a few trivial statements against a Trino coordinator.
//!
//! Executes `SHOW CATALOGS`, `SHOW SCHEMAS IN hive` and `SELECT 1` on one
//! cursor and prints the rows of each. Any failure aborts the run with a
//! non-zero exit status.

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use lakeprobe_core::config::{load_dotenv, profile_label};
use lakeprobe_trino::{Connection, QuerySmoke, TrinoConfig};

// ── CLI ─────────────────────────────────────────────────────────────

/// Query-engine smoke test against a local Trino.
#[derive(Parser, Debug)]
#[command(name = "query-smoke", version, about)]
struct Cli {
    /// Settings profile; `TRINO_*` keys are looked up as `{PROFILE}_TRINO_*` first.
    #[arg(long, env = "LAKEPROBE_PROFILE", default_value = "")]
    profile: String,

    /// Also print each result as an aligned table.
    #[arg(long)]
    table: bool,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let profile = cli.profile.to_uppercase();

    let config = TrinoConfig::from_env_profiled(&profile);
    info!(
        profile = %profile_label(&profile),
        url = %config.base_url(),
        catalog = %config.catalog,
        schema = %config.schema,
        "query-smoke starting"
    );

    let conn = Connection::connect(config).context("failed to configure Trino connection")?;
    let smoke = QuerySmoke::new(conn);

    let mut stdout = std::io::stdout().lock();
    let report = smoke
        .run(&mut stdout)
        .await
        .context("query-engine smoke test failed")?;

    if cli.table {
        for result in [&report.catalogs, &report.schemas, &report.select_one] {
            writeln!(stdout, "\n{}", result)?;
        }
    }

    info!("query-smoke finished");
    Ok(())
}
