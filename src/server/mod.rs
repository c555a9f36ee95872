//! HTTP server
//!
//! Serves the graph and project list as JSON, plus the front-end from a
//! configured document root or, without one, from the files bundled into the
//! binary:
//!
//! - `GET /api/graph?namespace=<ns>`: resource graph for a namespace
//! - `GET /api/projects`: projects (or namespaces) the client can see
//! - `GET /healthz`: liveness probe
//!
//! Each graph request builds its own [`crate::graph::Graph`]; the only state
//! shared between requests is the discovery driver and its client.

mod embedded;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::discovery::Discovery;
use crate::graph::Graph;
use crate::kube::ResourceSource;
use crate::models::Project;

/// Application state shared by all handlers
pub struct AppState<S> {
    pub discovery: Arc<Discovery<S>>,
    pub default_namespace: String,
}

impl<S> AppState<S> {
    pub fn new(discovery: Discovery<S>, default_namespace: impl Into<String>) -> Self {
        Self {
            discovery: Arc::new(discovery),
            default_namespace: default_namespace.into(),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            discovery: Arc::clone(&self.discovery),
            default_namespace: self.default_namespace.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    pub namespace: Option<String>,
}

/// Body returned when a request fails
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API error carrying the status code to answer with
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Build the router, serving `docroot` (or the bundled front-end) for every
/// non-API path
pub fn router<S: ResourceSource + 'static>(state: AppState<S>, docroot: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/api/graph", get(graph_handler::<S>))
        .route("/api/projects", get(projects_handler::<S>))
        .route("/healthz", get(health_check));

    let router = match docroot {
        Some(docroot) => {
            tracing::info!("Serving {} as the document root", docroot.display());
            router.fallback_service(ServeDir::new(docroot))
        }
        None => {
            tracing::info!("No document root configured, serving the bundled front-end");
            router.fallback(embedded::serve_embedded)
        }
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

pub async fn health_check() -> &'static str {
    "ok"
}

/// Build and return the graph for the requested namespace
pub async fn graph_handler<S: ResourceSource>(
    State(state): State<AppState<S>>,
    Query(query): Query<GraphQuery>,
) -> Json<Graph> {
    let namespace = query
        .namespace
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| state.default_namespace.clone());
    Json(state.discovery.build_graph(&namespace).await)
}

/// List the projects visible to the client
pub async fn projects_handler<S: ResourceSource>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Project>>, ApiError> {
    state
        .discovery
        .list_projects()
        .await
        .map(Json)
        .map_err(|e| {
            tracing::warn!("Failed to list projects: {}", e);
            ApiError::new(StatusCode::BAD_GATEWAY, e.to_string())
        })
}

/// Run the server until SIGINT/SIGTERM, then drain for at most `drain_timeout`
pub async fn serve(
    router: Router,
    port: u16,
    drain_timeout: Duration,
) -> anyhow::Result<()> {
    use anyhow::Context;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    tracing::info!("Listening on port {}", port);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            return result
                .context("Web server task failed")?
                .context("Web server error");
        }
        _ = shutdown_signal() => {}
    }

    tracing::info!("Initiating web server shutdown...");
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(drain_timeout, server).await {
        Ok(result) => {
            result
                .context("Web server task failed")?
                .context("Web server error")?;
            tracing::info!("Shutdown successful");
        }
        Err(_) => {
            tracing::warn!(
                "Shutdown timed out after {}s, dropping open connections",
                drain_timeout.as_secs()
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
