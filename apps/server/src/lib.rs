//! # cfgd server
//!
//! Serves the configuration container over plain HTML forms, plus `/health`, a small
//! JSON view of the registry and the Scalar API docs at `/api`.
//!
//! ## Example
//! ```no_run
//! use cfgd_server::Server;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

mod api;
mod handlers;
mod render;
mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use cfgd::domain::config::ApiConfig;
use cfgd::domain::events::ShutdownRequested;
use cfgd::kernel::server::ApiState;
use cfgd_event_bus::{EventBus, EventReceiverExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    tracing::warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and assembles the server.
    ///
    /// 1. Validates the TLS files, if any
    /// 2. Creates the event bus and subscribes to shutdown requests
    /// 3. Builds the container (seeds, snapshots, listeners)
    /// 4. Constructs the application state
    ///
    /// # Errors
    /// Returns an error if the TLS files are missing, the seeds are invalid or the
    /// snapshot directory cannot be used.
    pub fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, "Initializing server");

        let events = EventBus::new();
        let exit = events
            .subscribe_watch(ShutdownRequested::default())
            .context("Failed to subscribe to shutdown requests")?;

        let container =
            cfgd::init(&self.cfg, &events).context("Failed to initialize the container")?;

        let state = ApiState::builder()
            .config(self.cfg)
            .container(container)
            .events(events)
            .build()
            .context("Failed to finalize API state")?;
        Ok(Server { state, exit })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    exit: watch::Receiver<Arc<ShutdownRequested>>,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router, without binding a socket.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Serves until Ctrl+C, SIGTERM or an `EXIT` command.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        let grace = Duration::from_secs(cfg.server.shutdown_grace_seconds);

        info!(address = %address, ssl = cfg.server.ssl.is_some(), "Starting server");

        let app = self.router();

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();
        let exit = self.exit;

        tokio::spawn(async move {
            tokio::select! {
                res = shutdown_signal() => {
                    if let Err(e) = res {
                        error!("Error while waiting for shutdown signal: {e}");
                        return;
                    }
                    info!("Shutdown signal received, starting graceful shutdown...");
                },
                () = exit_requested(exit) => {
                    info!("EXIT command received, starting graceful shutdown...");
                },
            }
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        let closed = self.state.events.shutdown();
        info!(closed, "Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Resolves once an `EXIT` command has been accepted. Never resolves if the bus closes first.
async fn exit_requested(mut exit: watch::Receiver<Arc<ShutdownRequested>>) {
    if exit.borrow_and_update().is_requested() {
        return;
    }
    while let Some(latest) = exit.next_event().await {
        if latest.is_requested() {
            return;
        }
    }
    std::future::pending::<()>().await;
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
