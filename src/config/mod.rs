// Configuration module entry point
// Loads application configuration and validates publish settings

mod settings;
mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use settings::{GithubTarget, PublishSettings};
pub use state::AppState;
pub use types::{Config, GithubConfig, HttpConfig};

/// Deployment variables read verbatim (no prefix) and the keys they override
const DEPLOYMENT_VARS: [(&str, &str); 5] = [
    ("GITHUB_TOKEN", "github.token"),
    ("GITHUB_OWNER", "github.owner"),
    ("GITHUB_REPO", "github.repo"),
    ("GDD_PASSWORD", "publish.password"),
    ("ALLOWED_ORIGIN", "http.allowed_origin"),
];

/// `PUBLISHER__SECTION__KEY` variables
///
/// Values stay strings; numeric and boolean fields are converted during
/// deserialisation, so secrets such as `0123` keep their leading zeros.
fn prefixed_environment() -> config::Environment {
    config::Environment::with_prefix("PUBLISHER").separator("__")
}

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with(config_path, |name| std::env::var(name).ok())
    }

    /// Load configuration, resolving deployment variables through `lookup`
    pub fn load_with(
        config_path: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        Self::load_layered(config_path, prefixed_environment(), lookup)
    }

    fn load_layered(
        config_path: &str,
        environment: config::Environment,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(environment)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("http.server_name", "main-publisher/1.0")?
            .set_default("http.allowed_origin", "*")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("health.enabled", true)?
            .set_default("health.path", "/healthz")?
            .set_default("github.api_base", "https://api.github.com")?
            .set_default("github.api_version", "2022-11-28")?
            .set_default("github.user_agent", "GDD-AdminPanel/1.0")?
            .set_default("github.timeout", 15)?
            .set_default("publish.route", "/api/save-html")?
            .set_default("publish.default_path", "index.html")?
            .set_default("publish.default_message", "GDD edit via admin UI")?
            .set_default("publish.container_tag", "main")?;

        // Blank ALLOWED_ORIGIN falls back to the default, the others are kept
        // verbatim so validation can report them as missing
        for (var, key) in DEPLOYMENT_VARS {
            let value = lookup(var).filter(|v| key != "http.allowed_origin" || !v.is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const NO_FILE: &str = "this-config-file-does-not-exist";

    fn load(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::load_with(NO_FILE, |name| vars.get(name).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = load(&[]);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.http.allowed_origin, "*");
        assert_eq!(cfg.github.api_base, "https://api.github.com");
        assert_eq!(cfg.publish.route, "/api/save-html");
        assert_eq!(cfg.publish.default_path, "index.html");
        assert_eq!(cfg.publish.default_message, "GDD edit via admin UI");
        assert_eq!(cfg.publish.container_tag, "main");
        assert!(cfg.github.token.is_none());
        assert!(cfg.publish.password.is_none());
    }

    #[test]
    fn test_deployment_vars_override() {
        let cfg = load(&[
            ("GITHUB_TOKEN", "ghp_abc"),
            ("GITHUB_OWNER", "octo"),
            ("GITHUB_REPO", "gdd"),
            ("GDD_PASSWORD", "hunter2"),
            ("ALLOWED_ORIGIN", "https://octo.github.io"),
        ]);
        assert_eq!(cfg.github.token.as_deref(), Some("ghp_abc"));
        assert_eq!(cfg.github.owner.as_deref(), Some("octo"));
        assert_eq!(cfg.github.repo.as_deref(), Some("gdd"));
        assert_eq!(cfg.publish.password.as_deref(), Some("hunter2"));
        assert_eq!(cfg.http.allowed_origin, "https://octo.github.io");
    }

    #[test]
    fn test_blank_allowed_origin_uses_wildcard() {
        let cfg = load(&[("ALLOWED_ORIGIN", "")]);
        assert_eq!(cfg.http.allowed_origin, "*");
    }

    fn load_env(env: &[(&str, &str)]) -> Config {
        let source = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let environment = prefixed_environment().source(Some(source));
        Config::load_layered(NO_FILE, environment, |_| None).unwrap()
    }

    #[test]
    fn test_prefixed_env_keeps_numeric_strings() {
        let cfg = load_env(&[
            ("PUBLISHER__PUBLISH__PASSWORD", "0123"),
            ("PUBLISHER__GITHUB__OWNER", "007"),
            ("PUBLISHER__GITHUB__REPO", "1e3"),
        ]);
        assert_eq!(cfg.publish.password.as_deref(), Some("0123"));
        assert_eq!(cfg.github.owner.as_deref(), Some("007"));
        assert_eq!(cfg.github.repo.as_deref(), Some("1e3"));
    }

    #[test]
    fn test_prefixed_env_still_converts_typed_fields() {
        let cfg = load_env(&[
            ("PUBLISHER__SERVER__PORT", "9090"),
            ("PUBLISHER__LOGGING__ACCESS_LOG", "false"),
            ("PUBLISHER__HTTP__MAX_BODY_SIZE", "2048"),
        ]);
        assert_eq!(cfg.server.port, 9090);
        assert!(!cfg.logging.access_log);
        assert_eq!(cfg.http.max_body_size, 2048);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = load(&[]);
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);
    }
}
