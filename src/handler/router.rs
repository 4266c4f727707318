//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, resolution,
//! response generation and access logging.

use hyper::header::{
    HeaderValue, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT,
};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use super::listing;
use super::resolver::{self, Resolution};
use super::responder::{self, RequestMeta};
use crate::config::{AppState, ServerConfig};
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};

/// Value of the `Server` header
const SERVER_NAME: &str = concat!("serve/", env!("CARGO_PKG_VERSION"));

/// Main entry point for HTTP request handling.
///
/// The request body is never read; static serving only answers GET and HEAD.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Arc<str>,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    drop(body);

    let mut response = route_request(&parts, &state.config.server).await;
    response
        .headers_mut()
        .insert(SERVER, HeaderValue::from_static(SERVER_NAME));

    if state.access_log_enabled() {
        let entry = access_entry(&parts, &response, &remote_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }
    Ok(response)
}

async fn route_request(parts: &Parts, config: &ServerConfig) -> Response<ResponseBody> {
    if let Some(resp) = check_http_method(&parts.method) {
        return resp;
    }

    let path = parts.uri.path();
    let resolution = resolver::resolve(config, path).await;

    // Relative listing links only work below a trailing slash
    if matches!(resolution, Resolution::Directory(..)) && !path.ends_with('/') {
        // Rebuilt from the decoded segments so `//host` cannot leave the site
        let segments = resolver::decode_segments(path).unwrap_or_default();
        let target = listing::directory_url(&segments);
        let location = match parts.uri.query() {
            Some(query) => format!("{target}?{query}"),
            None => target,
        };
        return http::build_redirect_response(&location);
    }

    let meta = RequestMeta {
        path,
        accept_encoding: header_str(parts, ACCEPT_ENCODING),
        is_head: parts.method == Method::HEAD,
    };
    responder::respond(config, resolution, &meta).await
}

/// Return a 405 response for anything but GET/HEAD
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn header_str(parts: &Parts, name: hyper::header::HeaderName) -> Option<&str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

fn access_entry(
    parts: &Parts,
    response: &Response<ResponseBody>,
    remote_addr: &str,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = match parts.version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.content_encoding = response
        .headers()
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry.referer = header_str(parts, REFERER).map(ToString::to_string);
    entry.user_agent = header_str(parts, USER_AGENT).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
