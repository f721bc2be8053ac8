//! HTTP server lifecycle.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use warden_core::error::{WardenError, WardenResult};
use warden_engine::AuthorizationEngine;

use crate::routes::router;

/// Bound listener plus the router it will serve.
///
/// ```ignore
/// let server = Server::bind("127.0.0.1:8080", engine).await?;
/// server.run().await?;
/// ```
pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    pub async fn bind(addr: &str, engine: AuthorizationEngine) -> WardenResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| WardenError::InvalidInput(format!("cannot listen on {addr}: {e}")))?;

        Ok(Self {
            listener,
            router: router(engine),
        })
    }

    pub fn local_addr(&self) -> WardenResult<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| WardenError::Internal(format!("listener has no address: {e}")))
    }

    /// Serves until Ctrl-C.
    pub async fn run(self) -> WardenResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown requested");
        })
        .await
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> WardenResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "listening");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| WardenError::Internal(format!("server error: {e}")))?;

        tracing::info!(%addr, "server stopped");
        Ok(())
    }
}
