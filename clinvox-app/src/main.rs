//! ClinVox - Main entry point
//!
//! Opens or creates the clinic database, constructs the record store, and
//! serves the browser front end as static files. Patient, recording, and
//! assignment logic lives in the workflow modules of the library crate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinvox_common::{config, db::init_database, RecordStore};

/// Command-line arguments for clinvox-app
#[derive(Parser, Debug)]
#[command(name = "clinvox-app")]
#[command(about = "Clinical voice-capture tool")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "CLINVOX_PORT")]
    port: u16,

    /// Folder holding the clinic database
    #[arg(short, long, env = "CLINVOX_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    /// Folder served for static assets
    #[arg(short, long, default_value = "static", env = "CLINVOX_STATIC_FOLDER")]
    static_folder: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinvox=debug,clinvox_app=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting ClinVox on port {}", args.port);

    let data_folder = config::resolve_data_folder(
        args.data_folder.as_deref().and_then(|p| p.to_str()),
        "CLINVOX_DATA_FOLDER",
    )
    .context("Failed to resolve data folder")?;
    info!("Data folder: {}", data_folder.display());

    let pool = init_database(&config::database_path(&data_folder))
        .await
        .context("Failed to initialize database")?;

    // The store is built once here; every workflow takes a clone of it
    let store = RecordStore::new(pool);

    let stats = store
        .database_stats()
        .await
        .context("Failed to read database stats")?;
    info!(
        "{} patients, {} recordings ({} bytes of audio) on record",
        stats.total_patients, stats.total_recordings, stats.total_storage_bytes
    );

    clinvox_app::server::run(args.port, args.static_folder)
        .await
        .context("Server error")?;

    Ok(())
}
