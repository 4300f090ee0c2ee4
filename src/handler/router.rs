//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, the health
//! endpoint, route matching and access logging.

use crate::config::AppState;
use crate::handler::resize;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Liveness endpoint, served regardless of configured routes
pub const HEALTH_PATH: &str = "/health";

/// Per-request information needed by the image pipeline
pub struct RequestContext<'a> {
    /// Percent-decoded request path
    pub path: &'a str,
    /// Raw query string, exactly as sent
    pub query: Option<&'a str>,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let response = dispatch(req.method(), req.uri().path(), req.uri().query(), &state).await;

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            remote_addr.to_string(),
            req.method().as_str(),
            req.uri().path(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.content_type = header_string(response.headers().get("Content-Type"));
        entry.user_agent = header_string(req.headers().get("User-Agent"));
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a request to the health check or an image route
pub async fn dispatch(
    method: &Method,
    raw_path: &str,
    query: Option<&str>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    if method != Method::GET && method != Method::HEAD {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return http::build_405_response();
    }

    if raw_path == HEALTH_PATH {
        return http::build_health_response("OK");
    }

    let Ok(path) = urlencoding::decode(raw_path) else {
        return http::build_400_response("Invalid path encoding");
    };

    let Some(route) = state.routes.match_route(&path) else {
        return http::build_404_response();
    };

    let ctx = RequestContext {
        path: &path,
        query,
        is_head: method == Method::HEAD,
    };
    resize::serve_image(&ctx, route, state).await
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn header_string(value: Option<&hyper::header::HeaderValue>) -> Option<String> {
    value
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
