use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use orgdesk::{db, routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Variables from ./.env, if present, never override the real environment
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "-help" || arg == "--help") {
        println!("Usage: orgdesk [OPTIONS]");
        println!("Options:");
        println!("  -config <path>  Path to configuration file (default: ./etc/orgdesk.toml)");
        println!("  -help, --help   Print this help message");
        println!();
        println!("Environment (also read from ./.env):");
        println!("  DATABASE_URL    Overrides the configured database connection");
        println!("  RUST_LOG        Overrides the configured log level");
        return Ok(());
    }

    let config_path = args
        .iter()
        .skip_while(|arg| arg.as_str() != "-config")
        .nth(1)
        .map(|s| s.to_string())
        .unwrap_or_else(|| "./etc/orgdesk.toml".to_string());

    // Load configuration first (before logging init)
    let mut config = Config::load(&config_path).unwrap_or_else(|e| {
        eprintln!("Could not load config file: {}, using defaults", e);
        Config::default()
    });
    config.apply_env();

    // Priority: RUST_LOG env var > config file > default "info"
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting Orgdesk server...");
    info!("Loading configuration from: {}", config_path);

    let db_conn = db::init_database(&config.database).await.map_err(|e| {
        tracing::error!("Database initialization failed: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })?;

    let addr: SocketAddr = match config.addr.parse() {
        Ok(addr) => addr,
        Err(_) => {
            tracing::warn!("Invalid address '{}', using default 0.0.0.0:8000", config.addr);
            SocketAddr::from(([0, 0, 0, 0], 8000))
        }
    };

    let state = AppState::new(db_conn.clone(), config);
    let app = routes::create_router(state);

    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database pool");
    db_conn.close().await?;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or (on Unix) SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
