//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, body limits,
//! dispatch to the publisher and access logging.

use crate::config::{AppState, HttpConfig};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::publish::{Outcome, PublishError, PublishInput, SECRET_HEADER};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let config = &state.config;

    let mut entry = config.logging.access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.http_version = version_label(req.version()).to_string();
        entry.origin = header_str(&req, "origin").map(ToString::to_string);
        entry.user_agent = header_str(&req, "user-agent").map(ToString::to_string);
        entry
    });

    let response = route_request(req, &state).await;

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and configuration
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let config = &state.config;
    let path = req.uri().path();

    if config.health.enabled && path == config.health.path && req.method() == Method::GET {
        return http::build_health_response(&config.http);
    }

    if path != config.publish.route {
        return http::build_404_response(&config.http);
    }

    handle_publish(req, state).await
}

/// Read the body (POST only) and run the publish pipeline
async fn handle_publish<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let http_config = &state.config.http;
    let (parts, body) = req.into_parts();

    let body = if parts.method == Method::POST {
        if let Some(resp) = check_body_size(&parts.headers, http_config) {
            return resp;
        }
        match read_body(body, http_config).await {
            Ok(bytes) => bytes,
            Err(resp) => return resp,
        }
    } else {
        Bytes::new()
    };

    let input = PublishInput {
        method: &parts.method,
        secret: parts
            .headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok()),
        body: &body,
    };

    match state.publisher.handle(input).await {
        Ok(Outcome::Preflight) => http::build_preflight_response(http_config),
        Ok(Outcome::Published { path, commit }) => {
            logger::log_published(&path, &commit);
            http::build_commit_response(&commit, http_config)
        }
        Err(err) => {
            logger::log_publish_failed(&err);
            http::build_error_response(&err, http_config)
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    headers: &hyper::HeaderMap,
    http_config: &HttpConfig,
) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > http_config.max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {})",
                    http_config.max_body_size
                ));
                Some(http::build_413_response(http_config))
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Collect the body, enforcing the size limit while streaming
async fn read_body<B>(body: B, http_config: &HttpConfig) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = http_config.max_body_size;
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<http_body_util::LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response(http_config))
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_error_response(
                &PublishError::BadRequest("failed to read request body".into()),
                http_config,
            ))
        }
    }
}

fn header_str<'a, B>(req: &'a Request<B>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
}
