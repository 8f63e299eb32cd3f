//! Local web UI for xscp.
//!
//! Serves a single embedded page plus a small JSON API over the same
//! orchestrator the CLI and menu use.
//!
//! ## Endpoints
//!
//! - `GET /` - the embedded page
//! - `GET /api/list?path=` - sandboxed directory listing
//! - `GET /api/log` - recent audit lines
//! - `GET /api/last_destination` - destination to pre-fill
//! - `POST /api/scp` - run a transfer

pub mod api;

use axum::{
    Router,
    response::Html,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::num::NonZeroU16;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::context::AppContext;
use crate::core::{Orchestrator, PathSandbox};

/// Embedded HTML page
const INDEX_HTML: &str = include_str!("assets/index.html");

/// Shared state for the web server
#[derive(Clone)]
pub struct WebState {
    pub orchestrator: Arc<Orchestrator>,
    pub sandbox: Arc<PathSandbox>,
    pub default_port: NonZeroU16,
    pub history_limit: usize,
}

pub struct WebServer {
    bind_addr: SocketAddr,
    state: WebState,
    shutdown_tx: broadcast::Sender<()>,
}

impl WebServer {
    pub fn new(ctx: &AppContext, sandbox: PathSandbox) -> Self {
        let state = WebState {
            orchestrator: ctx.orchestrator.clone(),
            sandbox: Arc::new(sandbox),
            default_port: ctx.config.default_port,
            history_limit: ctx.config.history_limit,
        };
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            bind_addr: ctx.config.web_bind,
            state,
            shutdown_tx,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(serve_index))
            .route("/api/list", get(api::list_directory))
            .route("/api/log", get(api::history))
            .route("/api/last_destination", get(api::last_destination))
            .route("/api/scp", post(api::copy))
            .with_state(self.state.clone())
    }

    /// Start the web server. Runs until shutdown() is called.
    pub async fn start(&self) -> anyhow::Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;
        tracing::info!(
            addr = %self.bind_addr,
            root = %self.state.sandbox.root().display(),
            "Web UI listening"
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Signal the server to shut down gracefully.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
