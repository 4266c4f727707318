//! Response generation
//!
//! Turns a [`Resolution`] into an HTTP response: streams files, renders
//! listings, or emits the matching error status.

use hyper::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, VARY};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use std::io::{self, ErrorKind};
use std::path::Path;

use super::listing::render_listing;
use super::resolver::{ListingEntry, Resolution};
use crate::config::ServerConfig;
use crate::http::{self, body, mime, ResponseBody};
use crate::logger;

/// The parts of a request that shape the response
#[derive(Debug, Clone, Copy)]
pub struct RequestMeta<'a> {
    /// Raw request path
    pub path: &'a str,
    /// `Accept-Encoding` header value
    pub accept_encoding: Option<&'a str>,
    pub is_head: bool,
}

impl RequestMeta<'_> {
    fn wants_gzip(&self, config: &ServerConfig) -> bool {
        !config.unzipped && http::accepts_gzip(self.accept_encoding)
    }
}

/// Build the response for a resolved request
pub async fn respond(
    config: &ServerConfig,
    resolution: Resolution,
    meta: &RequestMeta<'_>,
) -> Response<ResponseBody> {
    match resolution {
        Resolution::File(path) => serve_file(config, &path, meta).await,
        Resolution::Directory(dir, entries) => serve_listing(config, &dir, &entries, meta),
        Resolution::NotFound => http::build_404_response(),
        Resolution::Forbidden => http::build_403_response(),
    }
}

async fn serve_file(
    config: &ServerConfig,
    path: &Path,
    meta: &RequestMeta<'_>,
) -> Response<ResponseBody> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => return open_error_response(&e, path),
    };
    let length = match file.metadata().await {
        Ok(metadata) => metadata.len(),
        Err(e) => return open_error_response(&e, path),
    };

    let body = if meta.is_head {
        body::empty()
    } else {
        body::file(file)
    };

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime::content_type_for(path));
    finish(config, builder, body, length, meta)
}

fn serve_listing(
    config: &ServerConfig,
    dir: &Path,
    entries: &[ListingEntry],
    meta: &RequestMeta<'_>,
) -> Response<ResponseBody> {
    let html = render_listing(&config.root, dir, entries);
    let length = html.len() as u64;
    let body = if meta.is_head {
        body::empty()
    } else {
        body::full(html)
    };

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8");
    finish(config, builder, body, length, meta)
}

/// Apply content encoding and length headers, then build.
///
/// Compressed bodies have no known length and go out chunked.
fn finish(
    config: &ServerConfig,
    mut builder: Builder,
    body: ResponseBody,
    length: u64,
    meta: &RequestMeta<'_>,
) -> Response<ResponseBody> {
    if !config.unzipped {
        builder = builder.header(VARY, "Accept-Encoding");
    }

    let body = if meta.wants_gzip(config) {
        builder = builder.header(CONTENT_ENCODING, "gzip");
        if meta.is_head {
            body
        } else {
            body::gzip(body)
        }
    } else {
        builder = builder.header(CONTENT_LENGTH, length);
        body
    };

    builder.body(body).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build 200 response for {}: {e}", meta.path));
        http::build_500_response()
    })
}

fn open_error_response(err: &io::Error, path: &Path) -> Response<ResponseBody> {
    match err.kind() {
        ErrorKind::NotFound => http::build_404_response(),
        ErrorKind::PermissionDenied => http::build_403_response(),
        _ => {
            logger::log_error(&format!("Failed to open '{}': {err}", path.display()));
            http::build_500_response()
        }
    }
}
