use clap::Parser;
use hybridrec_api::{ApiConfig, RestApi};
use hybridrec_storage::{ArtifactNames, BlobSource, SnapshotManager};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Hybrid click recommender: collaborative filtering adjusted by content similarity
#[derive(Parser, Debug)]
#[command(name = "hybridrec")]
#[command(about = "Serve top-N content recommendations over HTTP", long_about = None)]
struct Args {
    /// Artifact location: a local directory or an http(s) blob endpoint
    #[arg(long, env = "HYBRIDREC_SOURCE", default_value = "./data")]
    source: String,

    /// Blob container name (http sources only)
    #[arg(long, env = "HYBRIDREC_CONTAINER", default_value = "data")]
    container: String,

    /// Query string appended to blob requests, e.g. a shared access signature
    #[arg(long, env = "HYBRIDREC_BLOB_TOKEN", hide_env_values = true)]
    blob_token: Option<String>,

    /// Click log artifact
    #[arg(long, env = "HYBRIDREC_INTERACTIONS", default_value = "clicks.json")]
    interactions: String,

    /// Item embeddings artifact
    #[arg(long, env = "HYBRIDREC_EMBEDDINGS", default_value = "embeddings.json")]
    embeddings: String,

    /// Factor model artifact
    #[arg(long, env = "HYBRIDREC_MODEL", default_value = "model.json")]
    model: String,

    /// Address to bind the HTTP API to
    #[arg(long, env = "HYBRIDREC_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// HTTP API port
    #[arg(long, env = "HYBRIDREC_HTTP_PORT", default_value_t = 7071)]
    http_port: u16,

    /// Items returned when the request has no `n`
    #[arg(long, env = "HYBRIDREC_DEFAULT_N", default_value_t = 5)]
    default_n: usize,

    /// Largest `n` a request may ask for
    #[arg(long, env = "HYBRIDREC_MAX_N", default_value_t = 100)]
    max_n: usize,

    /// Bearer token required by POST /admin/reload
    #[arg(long, env = "HYBRIDREC_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// Exit instead of serving errors when the initial load fails
    #[arg(long, env = "HYBRIDREC_REQUIRE_SNAPSHOT")]
    require_snapshot: bool,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, env = "HYBRIDREC_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.default_n == 0 || args.default_n > args.max_n {
        anyhow::bail!(
            "--default-n must be between 1 and --max-n ({}), got {}",
            args.max_n,
            args.default_n
        );
    }

    info!("Starting hybridrec v{}", env!("CARGO_PKG_VERSION"));

    let source = BlobSource::parse(&args.source, &args.container, args.blob_token.clone());
    let names = ArtifactNames {
        interactions: args.interactions.clone(),
        embeddings: args.embeddings.clone(),
        model: args.model.clone(),
    };
    info!("Artifact source: {}", source.location());

    let manager = Arc::new(SnapshotManager::new(source, names));
    if let Err(e) = manager.initialize().await {
        if args.require_snapshot {
            return Err(e.into());
        }
        error!("Serving without a snapshot until POST /admin/reload succeeds");
    }

    let config = ApiConfig {
        default_n: args.default_n,
        max_n: args.max_n,
        admin_token: args.admin_token.clone(),
    };
    let bind = args.bind.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(manager, config, bind, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/api/recommend", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
