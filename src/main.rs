//! Signalpost - Status Page Service
//!
//! Serves public status pages built from component statuses, incident
//! timelines, and uptime check logs stored in SQLite.

mod config;
mod db;
mod retention;
mod status;
mod web;

use config::ServerConfig;
use db::Store;
use retention::RetentionManager;
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("signalpost=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting Signalpost on port {}...", cfg.http_port);
    tracing::info!("Using database at {}", cfg.db_path);

    // Initialize database
    let store = Arc::new(Store::new(&cfg.db_path)?);
    tracing::info!("Database initialized successfully");

    // Add sample project if none exist
    let projects = store.get_projects()?;
    if projects.is_empty() {
        tracing::info!("Adding sample project: Demo");
        let project = store.add_project("Demo", "demo")?;
        store.add_component(project.id, "API", db::ComponentStatus::Operational, 0)?;
        store.add_component(project.id, "Website", db::ComponentStatus::Operational, 1)?;
    }

    // Start uptime-log retention sweeper
    let retention = RetentionManager::new(store.clone(), cfg.log_retention_days);
    retention.start();

    // Start web server
    let server = Server::new(cfg, store);
    server.start().await?;

    // Unreached in normal operation; serve only returns on bind/accept errors
    retention.stop().await;

    Ok(())
}
