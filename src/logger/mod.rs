//! Logger module
//!
//! Provides logging utilities for the publisher including:
//! - Subscriber setup (`tracing-subscriber`, `RUST_LOG` overrides the config level)
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Publish outcome logging

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::publish::PublishError;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Publisher started, listening on http://{addr}");
    tracing::info!("Publish route: POST {}", config.publish.route);
    if config.health.enabled {
        tracing::info!("Health check: GET {}", config.health.path);
    }
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    tracing::info!(
        "Target: {}/{} ({} <{}>)",
        config.github.owner.as_deref().unwrap_or("?"),
        config.github.repo.as_deref().unwrap_or("?"),
        config.publish.default_path,
        config.publish.container_tag,
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_published(path: &str, commit: &str) {
    tracing::info!(path, commit, "Published new content");
}

pub fn log_publish_failed(err: &PublishError) {
    tracing::warn!(kind = err.kind(), status = err.status().as_u16(), "Publish failed: {err}");
}

pub fn log_shutdown() {
    tracing::info!("Shutdown signal received, no longer accepting connections");
}
