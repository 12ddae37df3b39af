use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::Config;
use crate::files::{DiskFiles, FileSource};
use crate::http::connection::Connection;
use crate::router::Router;

/// Listening socket plus everything a connection needs.
///
/// Lifecycle: [`bind`](Server::bind), then [`run`](Server::run) or
/// [`run_until`](Server::run_until); dropping the server closes the socket.
pub struct Server<F> {
    listener: TcpListener,
    router: Arc<Router<F>>,
    max_concurrent: usize,
    read_timeout: Option<Duration>,
}

impl Server<DiskFiles> {
    pub async fn bind(cfg: &Config) -> anyhow::Result<Self> {
        Self::bind_with(cfg, DiskFiles).await
    }
}

impl<F> Server<F>
where
    F: FileSource + Send + Sync + 'static,
{
    pub async fn bind_with(cfg: &Config, files: F) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&cfg.server.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", cfg.server.listen_addr))?;
        let router = Router::new(files, &cfg.static_files);

        info!(
            addr = %listener.local_addr()?,
            html_root = %router.html_root().display(),
            static_root = %router.static_root().display(),
            "Listening"
        );

        Ok(Self {
            listener,
            router: Arc::new(router),
            max_concurrent: cfg.server.max_concurrent_connections.max(1),
            read_timeout: cfg.server.read_timeout(),
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Only an accept failure ends it; a failing connection is
    /// logged and closed by [`Connection::run`].
    ///
    /// With a limit of one connection, each connection is served to completion
    /// before the next accept.
    pub async fn run(self) -> anyhow::Result<()> {
        let permits = Arc::new(Semaphore::new(self.max_concurrent));

        loop {
            let permit = permits.clone().acquire_owned().await?;
            let (socket, peer) = self.listener.accept().await.context("accept failed")?;
            info!("Accepted connection from {}", peer);

            let conn = Connection::new(socket, peer, self.router.clone())
                .with_read_timeout(self.read_timeout);

            if self.max_concurrent == 1 {
                serve(conn, peer).await;
                drop(permit);
            } else {
                tokio::spawn(async move {
                    serve(conn, peer).await;
                    drop(permit);
                });
            }
        }
    }

    /// Runs until `shutdown` resolves or accepting fails.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        tokio::select! {
            res = self.run() => res,
            _ = shutdown => {
                info!("Shutdown signal received");
                Ok(())
            }
        }
    }
}

async fn serve<F: FileSource>(mut conn: Connection<TcpStream, F>, peer: SocketAddr) {
    conn.run().await;
    tracing::debug!("Closed connection from {}", peer);
}
