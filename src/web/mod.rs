//! Web server module.

mod handlers;

pub use handlers::*;

use crate::config::ServerConfig;
use crate::db::Store;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<Store>,
}

/// Web server for Signalpost.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(config: ServerConfig, store: Arc<Store>) -> Self {
        Self {
            state: AppState { config, store },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            // Public status page (unauthenticated, read-only)
            .route("/status/{slug}", get(handlers::handle_status_page))
            .route("/status/{slug}/summary", get(handlers::handle_status_summary))
            .route("/status/{slug}/incidents", get(handlers::handle_status_incidents))
            // Management API: projects
            .route("/api/projects", post(handlers::handle_create_project))
            .route("/api/projects", get(handlers::handle_get_projects))
            .route("/api/projects/{id}", get(handlers::handle_get_project))
            .route("/api/projects/{id}", delete(handlers::handle_delete_project))
            // Management API: components
            .route(
                "/api/projects/{id}/components",
                post(handlers::handle_create_component),
            )
            .route(
                "/api/projects/{id}/components",
                get(handlers::handle_get_components),
            )
            .route("/api/components/{id}", put(handlers::handle_update_component))
            .route("/api/components/{id}", delete(handlers::handle_delete_component))
            // Management API: incidents
            .route(
                "/api/projects/{id}/incidents",
                post(handlers::handle_create_incident),
            )
            .route("/api/incidents/{id}", get(handlers::handle_get_incident))
            .route("/api/incidents/{id}", delete(handlers::handle_delete_incident))
            .route(
                "/api/incidents/{id}/updates",
                post(handlers::handle_create_incident_update),
            )
            // Management API: uptime checks and log ingestion
            .route("/api/projects/{id}/checks", post(handlers::handle_create_check))
            .route("/api/projects/{id}/checks", get(handlers::handle_get_checks))
            .route("/api/checks/{id}", delete(handlers::handle_delete_check))
            .route("/api/checks/{id}/logs", post(handlers::handle_ingest_logs))
            .route("/api/checks/{id}/logs", get(handlers::handle_get_logs))
            .layer(cors)
            .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
