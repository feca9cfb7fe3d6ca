use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use bucketdrop_core::config::Settings;
use bucketdrop_storage::ObjectStore;
use bucketdrop_storage::local::LocalObjectStore;

#[derive(Parser)]
#[command(name = "bucketdrop")]
#[command(about = "Accepts file uploads over HTTP and stores them in an S3 bucket")]
struct Cli {
    /// Object-store region (overrides AWS_REGION)
    #[arg(long)]
    region: Option<String>,

    /// Destination bucket (overrides S3_BUCKET)
    #[arg(long)]
    bucket: Option<String>,

    /// Key prefix for uploaded files (overrides S3_KEY_PATH)
    #[arg(long)]
    key_prefix: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<String>,

    /// Store objects under this directory instead of S3
    #[arg(long, env = "BUCKETDROP_LOCAL_DIR")]
    local_dir: Option<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Settings {
        let env = Settings::from_env();
        let pick = |flag: &Option<String>, resolved: String| {
            flag.clone().filter(|v| !v.is_empty()).unwrap_or(resolved)
        };
        Settings {
            region: pick(&self.region, env.region),
            bucket: pick(&self.bucket, env.bucket),
            key_prefix: pick(&self.key_prefix, env.key_prefix),
            port: pick(&self.port, env.port),
        }
    }
}

async fn build_store(cli: &Cli, settings: &Settings) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match &cli.local_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Using local object store");
            Arc::new(LocalObjectStore::new(dir)?)
        }
        None => build_s3_store(settings).await?,
    };

    tracing::info!(store = store.name(), "Testing connection to object store...");
    store
        .test_connection()
        .await
        .with_context(|| format!("Object store '{}' is not reachable", store.name()))?;
    Ok(store)
}

#[cfg(feature = "s3")]
async fn build_s3_store(settings: &Settings) -> anyhow::Result<Arc<dyn ObjectStore>> {
    use bucketdrop_storage::s3::S3ObjectStore;

    let store = S3ObjectStore::new(&settings.bucket, &settings.region)
        .await
        .context("Failed to load AWS configuration")?;
    tracing::info!(bucket = %store.bucket(), region = %settings.region, "Using S3 object store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "s3"))]
async fn build_s3_store(_settings: &Settings) -> anyhow::Result<Arc<dyn ObjectStore>> {
    anyhow::bail!("built without S3 support; pass --local-dir")
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings();
    tracing::info!(
        region = %settings.region,
        bucket = %settings.bucket,
        key_prefix = %settings.key_prefix,
        port = %settings.port,
        "Settings resolved"
    );

    let store = build_store(&cli, &settings).await?;
    bucketdrop_web::start_server(settings, store, shutdown_signal()).await
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bucketdrop=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}
