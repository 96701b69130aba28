//! store-smoke: exercise an S3-compatible object store end to end.
//!
//! Lists buckets, uploads a small object, reads it back, then lists the
//! bucket. Any failure aborts the run with a non-zero exit status.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use lakeprobe_core::config::{load_dotenv, profile_label};
use lakeprobe_store::{StoreClient, StoreConfig, StoreSmoke};

// ── CLI ─────────────────────────────────────────────────────────────

/// Object-store smoke test against a local MinIO (or any S3 endpoint).
#[derive(Parser, Debug)]
#[command(name = "store-smoke", version, about)]
struct Cli {
    /// Settings profile; `S3_*` keys are looked up as `{PROFILE}_S3_*` first.
    #[arg(long, env = "LAKEPROBE_PROFILE", default_value = "")]
    profile: String,
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

    let config = StoreConfig::from_env_profiled(&profile);
    info!(
        profile = %profile_label(&profile),
        endpoint = %config.endpoint,
        bucket = %config.bucket,
        "store-smoke starting"
    );

    let smoke = StoreSmoke::new(StoreClient::new(config));
    let mut stdout = std::io::stdout().lock();
    smoke
        .run(&mut stdout)
        .await
        .context("object-store smoke test failed")?;

    info!("store-smoke finished");
    Ok(())
}
