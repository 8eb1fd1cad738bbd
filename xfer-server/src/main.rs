//! xfer-server - Inventory transfer request service
//!
//! Product search for the transfer form plus submission of transfer requests,
//! which are emailed to the inventory officer (and any routed recipients).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xfer_server::config::{Args, ServerConfig};
use xfer_server::notify::{LogRelay, MailRelay, Notifier, SmtpRelay};
use xfer_server::{build_router, catalog, with_static_files, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xfer_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any network waits
    info!(
        "Starting inventory transfer service (xfer-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = ServerConfig::resolve(args).context("Invalid configuration")?;

    info!("Catalog: {}", config.database.describe());
    let catalog = catalog::connect(&config.database)
        .await
        .context("Failed to open product catalog")?;

    // Startup continues without the catalog; requests will report the failure
    match catalog.ping().await {
        Ok(()) => info!("✓ Connected to product catalog ({})", catalog.backend()),
        Err(e) => warn!("Product catalog not reachable yet: {}", e),
    }

    let relay: Arc<dyn MailRelay> = match &config.smtp {
        Some(smtp) => {
            let tls = if smtp.starttls { "required" } else { "opportunistic" };
            info!("Mail relay: {}:{} (TLS {})", smtp.host, smtp.port, tls);
            Arc::new(SmtpRelay::new(smtp).context("Failed to configure SMTP relay")?)
        }
        None => {
            warn!("EMAIL_HOST not set; transfer notifications will be logged, not sent");
            Arc::new(LogRelay)
        }
    };

    let notifier = Notifier::new(relay, config.router.clone(), config.sender.clone());
    info!(
        "Notifications via {} relay from {} to officer {} ({} extra route(s))",
        notifier.relay_name(),
        config.sender,
        notifier.router().officer(),
        notifier.router().routes().len()
    );

    let state = AppState::new(catalog, notifier);
    let app = with_static_files(build_router(state), &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("xfer-server listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
