use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::Notify;
use tracing::{info, warn};

use ndadesk_server::api::AppState;
use ndadesk_server::config::NdaDeskConfig;

/// NdaDesk dashboard HTTP server.
#[derive(Parser, Debug)]
#[command(name = "ndadesk-server", about = "Standalone HTTP server for NdaDesk")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "ndadesk.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Missing file means defaults.
    let config_exists = Path::new(&cli.config).exists();
    let config: NdaDeskConfig = if config_exists {
        toml::from_str(&std::fs::read_to_string(&cli.config)?)?
    } else {
        NdaDeskConfig::default()
    };

    let telemetry_guard = ndadesk_server::telemetry::init(&config.telemetry);

    if !config_exists {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    let backend = ndadesk_server::backend_factory::create_backend(&config.backend)?;
    let state = AppState::new(backend, config.server.secure_cookies)?;
    let app = ndadesk_server::api::router(state);

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "ndadesk-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM; in-flight requests
    // get `shutdown_timeout_seconds` to finish.
    let signalled = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let signalled = Arc::clone(&signalled);
        async move {
            shutdown_signal().await;
            signalled.notify_one();
        }
    });
    let timeout_secs = config.server.shutdown_timeout_seconds;
    let deadline = async {
        signalled.notified().await;
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
    };
    tokio::select! {
        result = server.into_future() => result?,
        () = deadline => warn!(timeout_secs, "shutdown timeout exceeded, dropping open connections"),
    }

    telemetry_guard.shutdown();
    info!("ndadesk-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
