//! HTTP response building module
//!
//! Every response is JSON (or empty for preflight) and carries the CORS headers.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::HttpConfig;
use crate::publish::PublishError;

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, X-GDD-PASSWORD";

/// Response body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ReplyBody<'a> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<&'a str>,
}

impl<'a> ReplyBody<'a> {
    pub const fn failure(error: &'a str) -> Self {
        Self {
            success: false,
            error: Some(error),
            commit: None,
        }
    }

    pub const fn committed(commit: &'a str) -> Self {
        Self {
            success: true,
            error: None,
            commit: Some(commit),
        }
    }
}

fn builder(status: StatusCode, http: &HttpConfig) -> hyper::http::response::Builder {
    Response::builder()
        .status(status)
        .header("Server", &http.server_name)
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, &http.allowed_origin)
        .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
        .header(ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS)
}

/// Build JSON response
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    http: &HttpConfig,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return fallback(StatusCode::INTERNAL_SERVER_ERROR, http);
        }
    };

    builder(status, http)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            fallback(status, http)
        })
}

/// Last-resort response when building failed, e.g. an origin that is not a
/// valid header value
fn fallback(status: StatusCode, http: &HttpConfig) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        br#"{"success":false,"error":"Internal server error"}"#,
    )));
    *response.status_mut() = if status.is_success() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        status
    };
    let headers = response.headers_mut();
    if let Ok(origin) = HeaderValue::from_str(&http.allowed_origin) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

/// Build 204 preflight response
pub fn build_preflight_response(http: &HttpConfig) -> Response<Full<Bytes>> {
    builder(StatusCode::NO_CONTENT, http)
        .header("Access-Control-Max-Age", "86400")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::NO_CONTENT, &e);
            fallback(StatusCode::NO_CONTENT, http)
        })
}

/// Build 200 response for a new commit
pub fn build_commit_response(commit: &str, http: &HttpConfig) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &ReplyBody::committed(commit), http)
}

/// Build failure response for a publish error
pub fn build_error_response(err: &PublishError, http: &HttpConfig) -> Response<Full<Bytes>> {
    let message = err.to_string();
    let mut response = json_response(err.status(), &ReplyBody::failure(&message), http);
    if matches!(err, PublishError::MethodNotAllowed) {
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    }
    response
}

/// Build 404 Not Found response for unknown routes
pub fn build_404_response(http: &HttpConfig) -> Response<Full<Bytes>> {
    json_response(StatusCode::NOT_FOUND, &ReplyBody::failure("Not Found"), http)
}

/// Build 413 Payload Too Large response
pub fn build_413_response(http: &HttpConfig) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &ReplyBody::failure("Payload Too Large"),
        http,
    )
}

/// Build health check response
pub fn build_health_response(http: &HttpConfig) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }), http)
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::SECRET_HEADER;
    use http_body_util::BodyExt;

    fn http_config(origin: &str) -> HttpConfig {
        HttpConfig {
            server_name: "test/1.0".into(),
            allowed_origin: origin.into(),
            max_body_size: 1024,
        }
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors(response: &Response<Full<Bytes>>, origin: &str) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], origin);
        assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
        let allowed = headers["access-control-allow-headers"].to_str().unwrap();
        assert!(allowed.contains("Content-Type"));
        assert!(allowed.to_ascii_lowercase().contains(SECRET_HEADER));
    }

    #[tokio::test]
    async fn test_commit_response_shape() {
        let response = build_commit_response("abc", &http_config("*"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response, "*");
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "success": true, "commit": "abc" }));
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = build_error_response(&PublishError::Conflict, &http_config("https://a.io"));
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_cors(&response, "https://a.io");
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("conflict"));
        assert!(body.get("commit").is_none());
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let response = build_error_response(&PublishError::MethodNotAllowed, &http_config("*"));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], ALLOWED_METHODS);
    }

    #[tokio::test]
    async fn test_preflight_is_empty_204() {
        let response = build_preflight_response(&http_config("*"));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_cors(&response, "*");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_invalid_origin_falls_back() {
        let response = build_404_response(&http_config("bad\norigin"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-methods"], ALLOWED_METHODS);
        let allowed = headers["access-control-allow-headers"].to_str().unwrap();
        assert!(allowed.to_ascii_lowercase().contains(SECRET_HEADER));
    }

    #[test]
    fn test_allowed_headers_name_secret_header() {
        assert!(ALLOWED_HEADERS.to_ascii_lowercase().ends_with(SECRET_HEADER));
    }
}
