//! API server implementation

use std::future::Future;

use axum::Router;
use donortrail_client::DonorService;
use donortrail_core::DonorConfig;
use tokio::net::TcpListener;

use crate::routes::{AppState, router};
use crate::{Error, Result};

/// donortrail API server
pub struct Server {
    addr: String,
    router: Router,
}

impl Server {
    /// Create a server for `config`, building the pipeline from it.
    pub fn new(config: &DonorConfig) -> Result<Self> {
        let service = DonorService::from_config(config)?;
        Ok(Self::with_service(config.bind_addr(), service))
    }

    /// Create a server around an existing pipeline.
    pub fn with_service(addr: impl Into<String>, service: DonorService) -> Self {
        Self {
            addr: addr.into(),
            router: router(AppState::new(service)),
        }
    }

    /// Address the server binds to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Binds the configured address and serves until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|source| Error::Bind {
                addr: self.addr.clone(),
                source,
            })?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    ///
    /// In-flight requests are allowed to finish before this returns.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match listener.local_addr() {
            Ok(local) => tracing::info!(addr = %local, "donortrail API listening"),
            Err(_) => tracing::info!(addr = %self.addr, "donortrail API listening"),
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(Error::Serve)?;

        tracing::info!("donortrail API stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM, waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Shutdown signal received");
}
