//! Server lifecycle: bind, serve, shut down.

use std::net::SocketAddr;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// Default `Cache-Control` lifetime applied in production-like
/// configuration, in seconds.
pub const DEFAULT_CACHE_MAX_AGE: u64 = 7200;

/// Options for [`crate::Addon::serve`].
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Port to bind; `None` lets the OS assign an ephemeral port.
    pub port: Option<u16>,
    /// When set, every response carries `Cache-Control: max-age={secs}`.
    pub cache_max_age: Option<u64>,
}

impl ServeOptions {
    /// Environment-derived defaults: port from `PORT`, caching enabled
    /// with [`DEFAULT_CACHE_MAX_AGE`] only when `ADDON_ENV=production`.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT").ok().and_then(|v| v.parse().ok());
        let cache_max_age = match std::env::var("ADDON_ENV") {
            Ok(env) if env == "production" => Some(DEFAULT_CACHE_MAX_AGE),
            _ => None,
        };
        Self { port, cache_max_age }
    }
}

#[derive(Debug, Error)]
#[error("failed to bind {addr}: {source}")]
pub struct BindError {
    pub addr: SocketAddr,
    #[source]
    pub source: std::io::Error,
}

/// Handle to a running addon server.
///
/// Owns the serve task and its shutdown trigger; dropping the handle
/// initiates shutdown.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    manifest_url: String,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Externally reachable manifest URL reported at startup.
    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    /// Requests graceful shutdown and waits for in-flight requests to
    /// finish.
    pub async fn shutdown(self) -> std::io::Result<()> {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(std::io::Error::other(err)),
        }
    }

    /// Runs until the server exits on its own (keeps the shutdown trigger
    /// alive for the duration).
    pub async fn wait(self) -> std::io::Result<()> {
        let ServerHandle { shutdown, task, .. } = self;
        let result = match task.await {
            Ok(result) => result,
            Err(err) => Err(std::io::Error::other(err)),
        };
        drop(shutdown);
        result
    }
}

/// Binds the listener and spawns the serve loop. Bind failure is returned,
/// never panicked, since the caller decides how to surface startup errors.
pub(crate) async fn serve(app: Router, options: &ServeOptions) -> Result<ServerHandle, BindError> {
    let requested = SocketAddr::from(([0, 0, 0, 0], options.port.unwrap_or(0)));

    let listener = TcpListener::bind(requested)
        .await
        .map_err(|source| BindError {
            addr: requested,
            source,
        })?;
    let addr = listener.local_addr().map_err(|source| BindError {
        addr: requested,
        source,
    })?;

    let manifest_url = format!("http://127.0.0.1:{}/manifest.json", addr.port());
    info!(%addr, url = %manifest_url, "HTTP addon accessible");

    let (shutdown, rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await
    });

    Ok(ServerHandle {
        addr,
        manifest_url,
        shutdown,
        task,
    })
}
