//! HTTP server for mdserve.
//!
//! Serves a directory over HTTP through a [`VirtualFs`], so Markdown files
//! arrive in the browser as styled HTML pages while everything else is
//! served as-is.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use mdserve_renderer::PendingCleanup;
//! use mdserve_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root: PathBuf::from("docs"),
//!         ..ServerConfig::default()
//!     };
//!     let cleanup = Arc::new(PendingCleanup::new());
//!
//!     let result = run_server(config, Arc::clone(&cleanup)).await;
//!     cleanup.drain().unwrap();
//!     result.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum fallback handler (spawn_blocking)
//!                        │
//!                        └─► VirtualFs::open
//!                                │
//!                                ├─► directory / other file ──► DirFs handle
//!                                │
//!                                └─► Markdown ──► Renderer ──► VirtualFile
//! ```
//!
//! The caller owns the [`PendingCleanup`] and drains it once [`run_server`]
//! returns, whether it returned an error or not.

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mdserve_config::RenderMode;
use mdserve_renderer::{DEFAULT_ENDPOINT, PendingCleanup, RemoteRenderer, Renderer};
use mdserve_vfs::{DirFs, RenderScope, VirtualFs};
use state::AppState;
use tokio::net::TcpListener;
use tokio::sync::watch;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory to serve.
    pub root: PathBuf,
    /// Render strategy.
    pub render_mode: RenderMode,
    /// Render every regular file instead of Markdown files only.
    pub render_all: bool,
    /// Stop the server on the first render failure.
    pub strict: bool,
    /// Rendering API endpoint for the remote strategy.
    pub remote_endpoint: String,
    /// Request timeout for the remote strategy (`None` waits indefinitely).
    pub remote_timeout: Option<Duration>,
    /// Stylesheet links for remotely rendered pages (`None` uses the defaults).
    pub remote_stylesheets: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 2000,
            root: PathBuf::from("."),
            render_mode: RenderMode::Local,
            render_all: false,
            strict: false,
            remote_endpoint: DEFAULT_ENDPOINT.to_owned(),
            remote_timeout: None,
            remote_stylesheets: None,
        }
    }
}

impl ServerConfig {
    /// Which files are rendered.
    #[must_use]
    pub fn render_scope(&self) -> RenderScope {
        RenderScope::from_render_all(self.render_all)
    }
}

/// Create server configuration from mdserve config.
#[must_use]
pub fn server_config_from_config(config: &mdserve_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: config.docs_resolved.root.clone(),
        render_mode: config.render.mode,
        render_all: config.render.render_all,
        strict: config.render.strict,
        remote_endpoint: config
            .render
            .remote
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
        remote_timeout: config.remote_timeout(),
        remote_stylesheets: config.render.remote.stylesheets.clone(),
    }
}

/// Build the configured render strategy.
///
/// The local strategy registers every stylesheet it writes with `cleanup`.
pub fn build_renderer(
    config: &ServerConfig,
    cleanup: Arc<PendingCleanup>,
) -> Result<Renderer, ServerError> {
    match config.render_mode {
        RenderMode::Local => Ok(Renderer::local(&config.root, cleanup)?),
        RenderMode::Remote => {
            let mut renderer =
                RemoteRenderer::new(config.remote_endpoint.clone(), config.remote_timeout);
            if let Some(stylesheets) = &config.remote_stylesheets {
                renderer = renderer.with_stylesheets(stylesheets.clone());
            }
            Ok(renderer.into())
        }
    }
}

/// Run the server until Ctrl-C, SIGTERM, or a strict-mode render failure.
///
/// # Errors
///
/// Returns an error if the server fails to start, or
/// [`ServerError::StrictAbort`] if strict mode stopped it.
pub async fn run_server(
    config: ServerConfig,
    cleanup: Arc<PendingCleanup>,
) -> Result<(), ServerError> {
    let renderer = build_renderer(&config, cleanup)?;
    let fs = VirtualFs::new(DirFs::new(&config.root), renderer, config.render_scope());
    log_serving(&fs, config.strict);

    let state = Arc::new(AppState::new(Arc::new(fs), config.strict));

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting server");

    serve(listener, state).await
}

fn log_serving(fs: &VirtualFs<DirFs>, strict: bool) {
    tracing::info!(
        root = %fs.inner().root().display(),
        renderer = fs.renderer().name(),
        scope = ?fs.scope(),
        strict,
        "Serving directory"
    );
    match fs.renderer() {
        Renderer::Local(local) => {
            tracing::info!(dir = %local.root().display(), "Stylesheets are written on render");
        }
        Renderer::Remote(remote) => {
            tracing::info!(endpoint = remote.endpoint(), "Rendering through remote API");
        }
    }
}

async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    let app = app::create_router(Arc::clone(&state));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.abort.subscribe()))
        .await?;

    match state.abort_reason() {
        Some(reason) => Err(ServerError::StrictAbort(reason)),
        None => Ok(()),
    }
}

/// Wait for Ctrl-C, SIGTERM, or a strict-mode abort.
async fn shutdown_signal(mut abort: watch::Receiver<Option<String>>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let aborted = async {
        if abort.wait_for(Option::is_some).await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Shutdown signal received, stopping server..."),
        () = terminate => tracing::info!("Terminate signal received, stopping server..."),
        () = aborted => tracing::info!("Render failure in strict mode, stopping server..."),
    }
}
