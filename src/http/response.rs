//! HTTP response building module
//!
//! Builders for the status codes the dinners server produces. A builder
//! failure is logged and replaced by an empty response instead of panicking.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Methods the server answers
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

fn body_for(content: Bytes, is_head: bool) -> Full<Bytes> {
    if is_head {
        Full::new(Bytes::new())
    } else {
        Full::new(content)
    }
}

fn finish(
    builder: hyper::http::response::Builder,
    body: Full<Bytes>,
    label: &str,
) -> Response<Full<Bytes>> {
    builder.body(body).unwrap_or_else(|e| {
        log_build_error(label, &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build a plain-text response with the given status
pub fn build_text_response(status: StatusCode, text: &str, is_head: bool) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", text.len());
    finish(
        builder,
        body_for(Bytes::copy_from_slice(text.as_bytes()), is_head),
        status.as_str(),
    )
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found", is_head)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let text = "405 Method Not Allowed";
    let builder = Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Allow", ALLOWED_METHODS);
    finish(builder, Full::new(Bytes::from(text)), "405")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large", false)
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type, If-None-Match")
            .header("Access-Control-Max-Age", "86400");
    }

    finish(builder, Full::new(Bytes::new()), "OPTIONS")
}

/// Build health probe response
pub fn build_health_response(status: StatusCode, text: &str, is_head: bool) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", text.len())
        .header("Cache-Control", "no-store");
    finish(
        builder,
        body_for(Bytes::copy_from_slice(text.as_bytes()), is_head),
        "health",
    )
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag)
        .header("Cache-Control", "no-cache");
    finish(builder, Full::new(Bytes::new()), "304")
}

/// Build HTML page response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content.len())
        .header("Cache-Control", "no-cache");
    finish(builder, body_for(Bytes::from(content), is_head), "HTML")
}

/// Build JSON response; `etag` is attached when given
pub fn build_json_response(
    status: StatusCode,
    json: Bytes,
    etag: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", json.len())
        .header("Cache-Control", "no-cache");
    if let Some(tag) = etag {
        builder = builder.header("ETag", tag);
    }
    finish(builder, body_for(json, is_head), "JSON")
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
