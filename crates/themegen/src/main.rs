//! themegen
//!
//! Generates theme binding companion sources from a manifest.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Theme binding companion generator
#[derive(Parser, Debug)]
#[command(name = "themegen")]
#[command(about = "Generate theme binding companions from a manifest", long_about = None)]
struct Args {
    /// Path to the manifest (.toml or .json)
    #[arg(short, long, default_value = "themegen.toml")]
    manifest: PathBuf,

    /// Output directory, overriding the manifest's `output`
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the companions that would be written without writing them
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("themegen=info,theme_codegen=info"));
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("themegen v{}", env!("CARGO_PKG_VERSION"));

    let report = themegen::generate(&args.manifest, args.out.as_deref(), args.dry_run)
        .with_context(|| format!("Failed to generate from {}", args.manifest.display()))?;

    if args.dry_run {
        for companion in &report.written {
            println!("{} -> {}", companion.companion, companion.path.display());
        }
    }

    if !report.is_success() {
        bail!(
            "{} of {} companions failed",
            report.failed.len(),
            report.failed.len() + report.written.len()
        );
    }

    Ok(())
}
