// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub health: HealthConfig,
    pub github: GithubConfig,
    pub publish: PublishConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    /// Seconds a client may take to send request headers
    pub read_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Value of `Access-Control-Allow-Origin` on every response
    pub allowed_origin: String,
    pub max_body_size: u64,
}

/// Health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    pub enabled: bool,
    pub path: String,
}

/// GitHub Contents API configuration
///
/// `owner`, `repo` and `token` stay optional here. They are validated once
/// at start-up by `PublishSettings::from_config`, and a missing value is
/// reported per request as a 500 instead of refusing to start.
#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    pub api_base: String,
    pub api_version: String,
    pub user_agent: String,
    /// Per-call timeout in seconds
    pub timeout: u64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Publish endpoint configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PublishConfig {
    pub route: String,
    pub default_path: String,
    pub default_message: String,
    /// Element whose inner markup gets replaced
    pub container_tag: String,
    #[serde(default)]
    pub password: Option<String>,
}
