//! Development server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use typecase_build::{BuildConfig, SiteBuilder};

use crate::livereload::{
    reload_client_script, ReloadHub, ReloadMessage, RELOAD_ROUTE, RELOAD_SCRIPT_ROUTE,
};
use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Build settings used for the initial build and every rebuild
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            port: 4600,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Build failed: {0}")]
    BuildFailed(String),
}

/// Shared server state.
struct ServerState {
    config: DevServerConfig,
    hub: ReloadHub,
}

/// Development server: builds the site, serves it, rebuilds on source
/// changes, and live-reloads connected browsers.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build once and start serving.
    pub async fn start(self) -> Result<(), ServerError> {
        let builder = SiteBuilder::new(self.config.build.clone());
        builder
            .build()
            .await
            .map_err(|e| ServerError::BuildFailed(e.to_string()))?;

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .expect("Invalid address");

        let state = Arc::new(RwLock::new(ServerState {
            config: self.config.clone(),
            hub: ReloadHub::new(),
        }));

        // Watch the whole source tree; any change triggers a rebuild.
        let watch_paths = vec![self.config.build.src_dir.clone()];
        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = Router::new()
            .route("/", get(index_handler))
            .route(RELOAD_ROUTE, get(ws_handler))
            .route(RELOAD_SCRIPT_ROUTE, get(reload_script_handler))
            .fallback_service(ServeDir::new(&self.config.build.out_dir))
            .with_state(state);

        tracing::info!("Serving {} at http://{addr}", self.config.build.out_dir.display());

        if self.config.open {
            let url = format!("http://{addr}");
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Rebuild after a source change and tell connected browsers.
async fn handle_watch_event(state: &Arc<RwLock<ServerState>>, event: WatchEvent) {
    let state = state.read().await;
    tracing::info!("{} changed: {}", event.kind(), event.path().display());

    let builder = SiteBuilder::new(state.config.build.clone());
    match builder.build().await {
        Ok(report) => {
            tracing::info!("Rebuilt in {}ms", report.duration_ms);
            state.hub.send(ReloadMessage::Reload);
        }
        Err(e) => {
            // Keep serving the last good output.
            tracing::error!("Rebuild failed: {e}");
            state.hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

/// Serve the built index page with the reload client injected.
async fn index_handler(State(state): State<Arc<RwLock<ServerState>>>) -> impl IntoResponse {
    let state = state.read().await;
    let index = state.config.build.out_dir.join("index.html");

    let page = match std::fs::read_to_string(&index) {
        Ok(page) => inject_reload_script(&page),
        Err(e) => format!(
            "<h1>No built page</h1><p>{}: {e}</p>",
            index.display()
        ),
    };
    Html(page)
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RwLock<ServerState>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<RwLock<ServerState>>) {
    let mut rx = {
        let state = state.read().await;
        state.hub.subscribe()
    };

    let msg = serde_json::to_string(&ReloadMessage::Connected).unwrap();
    if socket.send(Message::Text(msg.into())).await.is_err() {
        return;
    }

    // Forward reload messages to the browser
    while let Ok(reload_msg) = rx.recv().await {
        let json = serde_json::to_string(&reload_msg).unwrap();
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Handler for the reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        reload_client_script(),
    )
}

fn inject_reload_script(page: &str) -> String {
    let tag = format!("<script src=\"{RELOAD_SCRIPT_ROUTE}\"></script>");
    match page.rfind("</body>") {
        Some(at) => format!("{}{tag}\n{}", &page[..at], &page[at..]),
        None => format!("{page}\n{tag}"),
    }
}
