use anyhow::Context;
use clap::Parser;
use geofence::{Config, Geofence};
use geofence_server::run_server;
use std::path::{Path, PathBuf};
use tracing::info;

const SNAPSHOT_FILE: &str = "geofence.snapshot";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Directory holding the snapshot file. In-memory when omitted.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// JSON or TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    let config = if path.extension().is_some_and(|ext| ext == "toml") {
        Config::from_toml(&raw)?
    } else {
        Config::from_json(&raw)?
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geofence_server=info,geofence=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    let geofence = if let Some(dir) = args.data_dir {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
        let path = dir.join(SNAPSHOT_FILE);
        info!("Opening snapshot at {}", path.display());
        tokio::task::spawn_blocking(move || {
            Geofence::builder().snapshot_path(path).config(config).build()
        })
        .await??
    } else {
        info!("Opening in-memory geofence");
        Geofence::builder().config(config).build()?
    };

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl_c signal: {}", e);
        }
    };

    run_server(listener, geofence, shutdown).await?;

    Ok(())
}
