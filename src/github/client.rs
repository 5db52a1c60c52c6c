// Contents API client
// One read and one conditional write per publish, no retries

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};

use super::types::{ContentsResponse, ErrorMessage, RemoteFile, UpdateFileRequest, UpdateFileResponse};
use crate::config::{GithubConfig, GithubTarget};
use crate::publish::codec;
use crate::publish::{Phase, PublishError};

/// Commit id reported when GitHub's response carries none
const FALLBACK_COMMIT: &str = "ok";

/// GitHub Contents API client
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    api_base: String,
    api_version: String,
    timeout: Duration,
}

impl GithubClient {
    pub fn from_config(config: &GithubConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout);
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            api_version: config.api_version.clone(),
            timeout,
        })
    }

    /// Contents resource address for `path`
    pub fn contents_url(&self, target: &GithubTarget, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            target.owner,
            target.repo,
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, url: &str, target: &GithubTarget) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("token {}", target.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", &self.api_version)
    }

    fn network_error(&self, phase: Phase, err: &reqwest::Error) -> PublishError {
        let message = if err.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else {
            err.to_string()
        };
        PublishError::NetworkError { phase, message }
    }

    /// Fetch the current file and its SHA
    pub async fn fetch_file(
        &self,
        target: &GithubTarget,
        path: &str,
    ) -> Result<RemoteFile, PublishError> {
        let url = self.contents_url(target, path);
        tracing::debug!(%url, "fetching current file");

        let response = self
            .request(Method::GET, &url, target)
            .send()
            .await
            .map_err(|e| self.network_error(Phase::Read, &e))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(PublishError::NotFound {
                    path: path.to_string(),
                })
            }
            StatusCode::UNAUTHORIZED => return Err(PublishError::UpstreamAuthError),
            StatusCode::FORBIDDEN => {
                let body: ErrorMessage = response.json().await.unwrap_or_default();
                let rate_limited = body
                    .message
                    .is_some_and(|m| m.to_lowercase().contains("rate limit"));
                return Err(if rate_limited {
                    PublishError::UpstreamRateLimited
                } else {
                    PublishError::UpstreamForbidden
                });
            }
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(PublishError::upstream(Phase::Read, status.as_u16(), &text));
            }
            _ => {}
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.network_error(Phase::Read, &e))?;
        let data: ContentsResponse = serde_json::from_str(&body).map_err(|_| {
            PublishError::UpstreamProtocolError("GitHub returned an unreadable response".into())
        })?;

        let sha = data
            .sha
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PublishError::UpstreamProtocolError("GitHub did not return a SHA".into()))?;
        let encoded = data.content.ok_or_else(|| {
            PublishError::UpstreamProtocolError("GitHub did not return file content".into())
        })?;
        let content = codec::decode_content(&encoded)
            .map_err(|e| PublishError::UpstreamProtocolError(format!("GitHub {e}")))?;

        Ok(RemoteFile {
            path: path.to_string(),
            sha,
            content,
        })
    }

    /// Commit `content` over the version identified by `file.sha`.
    ///
    /// Returns the new commit SHA.
    pub async fn commit_file(
        &self,
        target: &GithubTarget,
        file: &RemoteFile,
        content: &str,
        message: &str,
    ) -> Result<String, PublishError> {
        let url = self.contents_url(target, &file.path);
        let encoded = codec::encode_content(content);
        let body = UpdateFileRequest {
            message,
            content: &encoded,
            sha: &file.sha,
        };
        tracing::debug!(%url, bytes = content.len(), "committing new content");

        let response = self
            .request(Method::PUT, &url, target)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.network_error(Phase::Write, &e))?;

        match response.status() {
            StatusCode::CONFLICT => return Err(PublishError::Conflict),
            StatusCode::UNPROCESSABLE_ENTITY => {
                let body: ErrorMessage = response.json().await.unwrap_or_default();
                return Err(PublishError::UpstreamRejected(body.message.unwrap_or_default()));
            }
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(PublishError::upstream(Phase::Write, status.as_u16(), &text));
            }
            _ => {}
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.network_error(Phase::Write, &e))?;
        let commit = serde_json::from_str::<UpdateFileResponse>(&body)
            .ok()
            .and_then(|r| r.commit)
            .and_then(|c| c.sha)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_COMMIT.to_string());

        Ok(commit)
    }
}
