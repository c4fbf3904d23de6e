//! HTTP server entry point.
//!
//! # Responsibility
//! - Load configuration, initialize logging and open the store.
//! - Serve the registry API until interrupted.

use log::{error, info};
use portfolio_core::{init_console_logging, init_logging, Store};
use portfolio_server::{router, ServerConfig};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("portfolio: {err}");
            return ExitCode::FAILURE;
        }
    };

    let logging = match config.log_dir.as_deref() {
        Some(dir) => init_logging(&config.log_level, dir),
        None => init_console_logging(&config.log_level),
    };
    if let Err(err) = logging {
        eprintln!("portfolio: logging init failed: {err}");
        return ExitCode::FAILURE;
    }

    match serve(config).await {
        Ok(()) => {
            info!("event=server_stop module=server status=ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=server_stop module=server status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(Store::open(&config.db_path)?);
    info!(
        "event=store_ready module=server status=ok db_path={}",
        config.db_path
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        "event=server_start module=server status=ok addr={}",
        listener.local_addr()?
    );

    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=signal_listen module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
    info!("event=shutdown_requested module=server status=ok");
}
