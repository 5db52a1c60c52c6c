// Contents API wire types

use serde::{Deserialize, Serialize};

/// `GET /repos/{owner}/{repo}/contents/{path}` response (fields we use)
#[derive(Debug, Deserialize)]
pub struct ContentsResponse {
    #[serde(default)]
    pub sha: Option<String>,
    /// Base64, wrapped with newlines
    #[serde(default)]
    pub content: Option<String>,
}

/// `PUT` body creating a commit that replaces the file
#[derive(Debug, Serialize)]
pub struct UpdateFileRequest<'a> {
    pub message: &'a str,
    pub content: &'a str,
    pub sha: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFileResponse {
    #[serde(default)]
    pub commit: Option<CommitRef>,
}

#[derive(Debug, Deserialize)]
pub struct CommitRef {
    #[serde(default)]
    pub sha: Option<String>,
}

/// Error body GitHub sends with 4xx responses
#[derive(Debug, Default, Deserialize)]
pub struct ErrorMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Current version of a file, valid for exactly one commit against it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    /// Optimistic concurrency token for the write
    pub sha: String,
    pub content: String,
}
