use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use game_host_server::api::{self, AppState};
use game_host_server::config::Config;
use game_host_server::filer::LocalFileService;
use game_host_server::records;
use game_host_vfs::ServiceRoot;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("game-host - virtual game file namespace over HTTP");
    println!();
    println!("USAGE:");
    println!("    game-host [CONFIG]");
    println!();
    println!("ARGS:");
    println!("    CONFIG           Config file (default: {})", Config::default_config_path().display());
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version");
    println!();
    println!("ENDPOINTS:");
    println!("    GET /health");
    println!("    GET /files/<path>?user=<id>");
    println!("    GET /tree/<path>?user=<id>&depth=<n>");
    println!("    GET /spec/<tool|shiplist>/<id>?files=a,b   (base64 contents)");
}

/// Load config from the given path, or from the default location
fn load_config(arg: Option<&str>) -> anyhow::Result<Config> {
    if let Some(path) = arg {
        return Config::load_from_path(&PathBuf::from(path));
    }
    if let Err(e) = Config::create_default_if_missing() {
        warn!(error = %e, "could not write default config");
    }
    Config::load()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging (tracing)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    // Handle --version and --help
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--version" | "-v") => {
            println!("game-host {VERSION}");
            return Ok(());
        }
        Some("--help" | "-h") => {
            print_help();
            return Ok(());
        }
        _ => {}
    }

    // === LOAD CONFIGURATION ===
    let config = load_config(args.get(1).map(String::as_str))?;

    let files = LocalFileService::new(&config.storage.root).with_context(|| {
        format!("Cannot open file store {}", config.storage.root.display())
    })?;
    info!(root = %files.root().display(), "file store ready");
    let store = records::load_store(&config.storage.records)?;

    let root = ServiceRoot::new(Arc::new(files), Arc::new(store)).with_options(config.options());

    // === START HTTP SERVER (axum) ===
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::app(AppState::new(root))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;
    info!(%addr, version = VERSION, "game-host listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("shut down");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("graceful shutdown initiated");
}
