// Publish handler
// Linear pipeline from inbound request to new commit

use hyper::Method;

use super::error::PublishError;
use super::request::PublishRequest;
use super::splice::ContainerSplicer;
use crate::config::PublishSettings;
use crate::github::GithubClient;

/// The parts of an inbound request the pipeline looks at
#[derive(Debug, Clone, Copy)]
pub struct PublishInput<'a> {
    pub method: &'a Method,
    /// Raw value of the secret header, if present and valid text
    pub secret: Option<&'a str>,
    pub body: &'a [u8],
}

/// Successful outcomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// CORS preflight, answered without touching the body
    Preflight,
    Published { path: String, commit: String },
}

/// Publish handler, built once and shared by all requests
#[derive(Debug)]
pub struct Publisher {
    settings: PublishSettings,
    client: GithubClient,
    splicer: ContainerSplicer,
}

impl Publisher {
    pub fn new(settings: PublishSettings, client: GithubClient) -> Result<Self, regex::Error> {
        let splicer = ContainerSplicer::new(&settings.container_tag)?;
        Ok(Self {
            settings,
            client,
            splicer,
        })
    }

    pub async fn handle(&self, input: PublishInput<'_>) -> Result<Outcome, PublishError> {
        match *input.method {
            Method::OPTIONS => return Ok(Outcome::Preflight),
            Method::POST => {}
            _ => return Err(PublishError::MethodNotAllowed),
        }

        self.authorize(input.secret)?;

        let request = PublishRequest::parse(
            input.body,
            &self.settings.default_path,
            &self.settings.default_message,
        )?;

        let target = self.settings.target().map_err(|missing| {
            PublishError::ServerMisconfigured(format!(
                "{} not configured on the server",
                missing.join(", ")
            ))
        })?;

        let file = self.client.fetch_file(target, &request.target_path).await?;

        let updated = self
            .splicer
            .splice(&file.content, &request.html_fragment)
            .ok_or_else(|| PublishError::UnprocessableContent {
                tag: self.splicer.tag().to_string(),
            })?;

        let commit = self
            .client
            .commit_file(target, &file, &updated, &request.commit_message)
            .await?;

        Ok(Outcome::Published {
            path: request.target_path,
            commit,
        })
    }

    /// Plain equality on trimmed values, not constant-time
    fn authorize(&self, secret: Option<&str>) -> Result<(), PublishError> {
        let expected = self.settings.password().ok_or_else(|| {
            PublishError::ServerMisconfigured("GDD_PASSWORD not configured on the server".into())
        })?;

        if secret.unwrap_or_default().trim() == expected {
            Ok(())
        } else {
            Err(PublishError::Forbidden)
        }
    }
}
