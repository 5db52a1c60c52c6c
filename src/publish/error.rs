//! Publish error taxonomy.

use hyper::StatusCode;

/// Upstream bodies are cut to this many characters before being echoed back.
pub const UPSTREAM_BODY_LIMIT: usize = 200;

/// Request phase against the Contents API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Read,
    Write,
}

impl Phase {
    pub const fn method(self) -> &'static str {
        match self {
            Self::Read => "GET",
            Self::Write => "PUT",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.method())
    }
}

/// Every way a publish request can fail.
///
/// The `Display` text is what the caller sees in `error`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    ServerMisconfigured(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error("file '{path}' not found")]
    NotFound { path: String },

    #[error("GITHUB_TOKEN is invalid or expired")]
    UpstreamAuthError,

    #[error("GitHub rate limit reached, try again in a few minutes")]
    UpstreamRateLimited,

    #[error("token lacks permission (403)")]
    UpstreamForbidden,

    #[error("GitHub {phase} {status}: {body}")]
    UpstreamError {
        phase: Phase,
        status: u16,
        body: String,
    },

    #[error("{0}")]
    UpstreamProtocolError(String),

    #[error("tag <{tag}> not found in file")]
    UnprocessableContent { tag: String },

    #[error("SHA conflict, reload and retry")]
    Conflict,

    #[error("GitHub rejected the commit: {0}")]
    UpstreamRejected(String),

    #[error("network error ({phase}): {message}")]
    NetworkError { phase: Phase, message: String },
}

impl PublishError {
    /// Generic non-success with the body cut to [`UPSTREAM_BODY_LIMIT`] characters
    pub fn upstream(phase: Phase, status: u16, body: &str) -> Self {
        Self::UpstreamError {
            phase,
            status,
            body: body.chars().take(UPSTREAM_BODY_LIMIT).collect(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ServerMisconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::UnprocessableContent { .. } | Self::UpstreamRejected(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::UpstreamAuthError
            | Self::UpstreamRateLimited
            | Self::UpstreamForbidden
            | Self::UpstreamError { .. }
            | Self::UpstreamProtocolError(_)
            | Self::NetworkError { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short variant name for logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::ServerMisconfigured(_) => "ServerMisconfigured",
            Self::Forbidden => "Forbidden",
            Self::BadRequest(_) => "BadRequest",
            Self::NotFound { .. } => "NotFound",
            Self::UpstreamAuthError => "UpstreamAuthError",
            Self::UpstreamRateLimited => "UpstreamRateLimited",
            Self::UpstreamForbidden => "UpstreamForbidden",
            Self::UpstreamError { .. } => "UpstreamError",
            Self::UpstreamProtocolError(_) => "UpstreamProtocolError",
            Self::UnprocessableContent { .. } => "UnprocessableContent",
            Self::Conflict => "Conflict",
            Self::UpstreamRejected(_) => "UpstreamRejected",
            Self::NetworkError { .. } => "NetworkError",
        }
    }
}
