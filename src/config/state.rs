// Application state module
// Shared, read-only state handed to every connection

use super::settings::PublishSettings;
use super::types::Config;
use crate::github::GithubClient;
use crate::publish::Publisher;

/// Application state
pub struct AppState {
    pub config: Config,
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let client = GithubClient::from_config(&config.github)?;
        let settings = PublishSettings::from_config(config);
        let publisher = Publisher::new(settings, client)?;

        Ok(Self {
            config: config.clone(),
            publisher,
        })
    }
}
