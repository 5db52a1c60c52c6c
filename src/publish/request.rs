// Publish request payload

use serde::Deserialize;

use super::error::PublishError;

/// Wire shape of the request body
#[derive(Debug, Deserialize)]
struct RawPublishRequest {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    main_html: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A validated publish request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub target_path: String,
    pub html_fragment: String,
    pub commit_message: String,
}

impl PublishRequest {
    /// Parse a JSON body, filling `path` and `message` from the defaults.
    ///
    /// The fragment itself is kept untrimmed; only its emptiness is judged
    /// after trimming.
    pub fn parse(
        body: &[u8],
        default_path: &str,
        default_message: &str,
    ) -> Result<Self, PublishError> {
        let raw: RawPublishRequest = serde_json::from_slice(body)
            .map_err(|e| PublishError::BadRequest(format!("invalid JSON body: {e}")))?;

        let html_fragment = raw
            .main_html
            .filter(|html| !html.trim().is_empty())
            .ok_or_else(|| PublishError::BadRequest("field main_html is missing or empty".into()))?;

        let target_path = raw
            .path
            .map(|p| p.trim().trim_start_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| default_path.to_string());

        if !is_repository_path(&target_path) {
            return Err(PublishError::BadRequest(format!(
                "path '{target_path}' must name a file inside the repository"
            )));
        }

        let commit_message = raw
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_message.to_string());

        Ok(Self {
            target_path,
            html_fragment,
            commit_message,
        })
    }
}

/// A path stays under `contents/` once the URL parser normalises it: no dot
/// segments (literal or percent-encoded, with `\` counted as a separator)
/// and no query or fragment delimiters.
fn is_repository_path(path: &str) -> bool {
    if path.contains(['?', '#']) {
        return false;
    }
    path.split(['/', '\\']).all(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment != "." && segment != ".."
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<PublishRequest, PublishError> {
        PublishRequest::parse(body.as_bytes(), "index.html", "default msg")
    }

    #[test]
    fn test_defaults_applied() {
        let req = parse(r#"{"main_html":"<p>hi</p>"}"#).unwrap();
        assert_eq!(req.target_path, "index.html");
        assert_eq!(req.commit_message, "default msg");
        assert_eq!(req.html_fragment, "<p>hi</p>");
    }

    #[test]
    fn test_explicit_fields() {
        let req = parse(r#"{"path":"/docs/gdd.html","main_html":" <p>x</p> ","message":"edit"}"#)
            .unwrap();
        assert_eq!(req.target_path, "docs/gdd.html");
        assert_eq!(req.commit_message, "edit");
        assert_eq!(req.html_fragment, " <p>x</p> ");
    }

    #[test]
    fn test_missing_fragment() {
        assert!(matches!(parse(r#"{"path":"a.html"}"#), Err(PublishError::BadRequest(_))));
    }

    #[test]
    fn test_blank_fragment() {
        assert!(matches!(parse(r#"{"main_html":""}"#), Err(PublishError::BadRequest(_))));
        assert!(matches!(parse(r#"{"main_html":" \n\t "}"#), Err(PublishError::BadRequest(_))));
    }

    #[test]
    fn test_non_string_fragment() {
        assert!(matches!(parse(r#"{"main_html":42}"#), Err(PublishError::BadRequest(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse("not json"), Err(PublishError::BadRequest(_))));
        assert!(matches!(parse(""), Err(PublishError::BadRequest(_))));
    }

    #[test]
    fn test_rejects_paths_leaving_contents() {
        for path in [
            "../../../user",
            "docs/../../secrets",
            "./index.html",
            "docs\\..\\..\\user",
            "%2e%2e/%2E%2E/user",
            "index.html?ref=main",
            "index.html#top",
        ] {
            let body = serde_json::json!({ "path": path, "main_html": "<p>x</p>" }).to_string();
            assert!(
                matches!(parse(&body), Err(PublishError::BadRequest(_))),
                "path {path}"
            );
        }
    }

    #[test]
    fn test_accepts_dotted_file_names() {
        let req = parse(r#"{"path":"docs/v1..2/.hidden.html","main_html":"<p>x</p>"}"#).unwrap();
        assert_eq!(req.target_path, "docs/v1..2/.hidden.html");
    }
}
