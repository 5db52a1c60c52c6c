// Publish settings module
// Validates the secret and GitHub target once at start-up

use super::types::Config;

/// Repository coordinates and credential for the Contents API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubTarget {
    pub owner: String,
    pub repo: String,
    pub token: String,
}

/// Validated publish settings
///
/// Missing values are recorded rather than rejected, so the handler can
/// report them in request order (secret before payload before GitHub).
#[derive(Debug, Clone)]
pub struct PublishSettings {
    password: Option<String>,
    target: Result<GithubTarget, Vec<&'static str>>,
    pub default_path: String,
    pub default_message: String,
    pub container_tag: String,
}

impl PublishSettings {
    pub fn from_config(config: &Config) -> Self {
        let password = non_blank(config.publish.password.as_deref()).map(str::to_string);

        let github = &config.github;
        let owner = non_blank(github.owner.as_deref());
        let repo = non_blank(github.repo.as_deref());
        let token = non_blank(github.token.as_deref());

        let target = match (owner, repo, token) {
            (Some(owner), Some(repo), Some(token)) => Ok(GithubTarget {
                owner: owner.to_string(),
                repo: repo.to_string(),
                token: token.to_string(),
            }),
            _ => Err([
                ("GITHUB_OWNER", owner),
                ("GITHUB_REPO", repo),
                ("GITHUB_TOKEN", token),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()),
        };

        Self {
            password,
            target,
            default_path: config.publish.default_path.clone(),
            default_message: config.publish.default_message.clone(),
            container_tag: config.publish.container_tag.clone(),
        }
    }

    /// Trimmed shared secret, `None` when unset or blank
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// GitHub target, or the names of the missing variables
    pub fn target(&self) -> Result<&GithubTarget, &[&'static str]> {
        self.target.as_ref().map_err(Vec::as_slice)
    }
}

/// Trim and drop empty values
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
