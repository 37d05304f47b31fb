//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, body size
//! check, route matching, and access logging.

use crate::config::AppState;
use crate::handler::page;
use crate::http::{self, cache};
use crate::loader::{LoadError, PageData};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response, StatusCode, Version};
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub content_length: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            method: req.method(),
            path: req.uri().path(),
            is_head: req.method() == Method::HEAD,
            if_none_match: header_str(req, "if-none-match"),
            content_length: header_str(req, "content-length"),
        }
    }
}

fn header_str<'a, B>(req: &'a Request<B>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// JSON body of a failed data request
#[derive(Serialize)]
struct ErrorBody<'a> {
    status: u16,
    error: &'static str,
    message: &'a str,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let mut response = respond(&ctx, &state).await;
    set_server_header(&mut response, &state.config.http.server_name);

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Produce the response for a request without side effects on the connection
pub async fn respond(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(ctx.method, state.config.http.enable_cors) {
        return resp;
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(ctx.content_length, state.config.http.max_body_size) {
        return resp;
    }

    // 3. Dispatch
    route_request(ctx, state).await
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    content_length: Option<&str>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let size_str = content_length?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
        _ => None,
    }
}

/// Route request based on path and configuration
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let routes = &state.config.routes;

    // Health check endpoints first, always cheap
    if routes.health.enabled {
        if ctx.path == routes.health.liveness_path {
            return http::build_health_response(StatusCode::OK, "ok", ctx.is_head);
        }
        if ctx.path == routes.health.readiness_path {
            return if state.loader.is_available().await {
                http::build_health_response(StatusCode::OK, "ok", ctx.is_head)
            } else {
                http::build_health_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "not ready",
                    ctx.is_head,
                )
            };
        }
    }

    if ctx.path == routes.page_path {
        return serve_page(ctx, state).await;
    }

    if ctx.path == routes.data_path {
        return serve_data(ctx, state).await;
    }

    http::build_404_response(ctx.is_head)
}

/// Load the data file and render the dinners page
async fn serve_page(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match state.loader.load().await {
        Ok(data) => http::build_html_response(page::render_dinners_page(&data), ctx.is_head),
        Err(err) => {
            log_load_failure(ctx, &err);
            http::build_text_response(err.status(), &err.message(), ctx.is_head)
        }
    }
}

/// Load the data file and return `{"dinners": ...}` as JSON
async fn serve_data(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match state.loader.load().await {
        Ok(data) => data_response(ctx, &data),
        Err(err) => {
            log_load_failure(ctx, &err);
            let message = err.message();
            error_json(err.status(), &message, ctx.is_head)
        }
    }
}

fn data_response(ctx: &RequestContext<'_>, data: &PageData) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(data) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize dinners: {e}"));
            return error_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ctx.is_head,
            );
        }
    };

    let etag = cache::generate_etag(&json);
    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_json_response(StatusCode::OK, Bytes::from(json), Some(&etag), ctx.is_head)
}

fn error_json(status: StatusCode, message: &str, is_head: bool) -> Response<Full<Bytes>> {
    let body = ErrorBody {
        status: status.as_u16(),
        error: LoadError::CLASSIFICATION,
        message,
    };
    let json = serde_json::to_vec(&body).unwrap_or_else(|_| br#"{"status":500}"#.to_vec());
    http::build_json_response(status, Bytes::from(json), None, is_head)
}

fn log_load_failure(ctx: &RequestContext<'_>, err: &LoadError) {
    logger::log_failure_chain(
        &format!(
            "{} {} ({} reading {})",
            ctx.method,
            ctx.path,
            err.kind(),
            err.path().display()
        ),
        err,
    );
}

fn set_server_header(response: &mut Response<Full<Bytes>>, server_name: &str) {
    match HeaderValue::from_str(server_name) {
        Ok(value) => {
            response.headers_mut().insert(SERVER, value);
        }
        Err(_) => logger::log_warning(&format!("Invalid server name header: '{server_name}'")),
    }
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_str(req, "referer").map(ToString::to_string);
    entry.user_agent = header_str(req, "user-agent").map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::loader::SchemaMode;
    use http_body_util::{BodyExt, Empty};
    use hyper::header;
    use tempfile::TempDir;

    /// State serving `<root>/dinners.json` from base dir `<root>/web`
    fn test_state(content: Option<&str>) -> (TempDir, Arc<AppState>) {
        let root = TempDir::new().unwrap();
        let web = root.path().join("web");
        std::fs::create_dir(&web).unwrap();
        if let Some(text) = content {
            std::fs::write(root.path().join("dinners.json"), text).unwrap();
        }

        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.logging.access_log = false;
        config.data.base_dir = Some(web.to_string_lossy().into_owned());
        let state = Arc::new(AppState::new(&config));
        (root, state)
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn request(method: Method, path: &str) -> Request<Empty<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Empty::new())
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Empty<Bytes>>) -> Response<Full<Bytes>> {
        handle_request(req, Arc::clone(state), peer()).await.unwrap()
    }

    async fn body_text(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_data_route_returns_mapping() {
        let (_root, state) = test_state(Some(r#"[{"name":"Tacos","date":"2024-01-01"}]"#));
        let resp = send(&state, request(Method::GET, "/__data.json")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        assert!(resp.headers().contains_key(header::ETAG));
        let value: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"dinners": [{"name": "Tacos", "date": "2024-01-01"}]})
        );
    }

    #[tokio::test]
    async fn test_data_route_keeps_file_key_order() {
        let (_root, state) = test_state(Some(
            r#"[{"name":"Tacos","date":"2024-01-01","guests":{"zoe":1,"adam":2}}]"#,
        ));
        let resp = send(&state, request(Method::GET, "/__data.json")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            body_text(resp).await,
            r#"{"dinners":[{"name":"Tacos","date":"2024-01-01","guests":{"zoe":1,"adam":2}}]}"#
        );
    }

    #[tokio::test]
    async fn test_data_route_deep_nesting() {
        let depth = 200;
        let nested = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let (_root, state) = test_state(Some(&nested));
        let resp = send(&state, request(Method::GET, "/__data.json")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(body_text(resp).await, format!(r#"{{"dinners":{nested}}}"#));
    }

    #[tokio::test]
    async fn test_data_route_object_passthrough() {
        let (_root, state) = test_state(Some("{}"));
        let resp = send(&state, request(Method::GET, "/__data.json")).await;
        assert_eq!(body_text(resp).await, r#"{"dinners":{}}"#);
    }

    #[tokio::test]
    async fn test_data_route_missing_file() {
        let (_root, state) = test_state(None);
        let resp = send(&state, request(Method::GET, "/__data.json")).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(
            body_text(resp).await,
            r#"{"status":500,"error":"server error","message":"Failed to load dinners.json"}"#
        );
    }

    #[tokio::test]
    async fn test_page_route_renders() {
        let (_root, state) = test_state(Some(r#"[{"name":"Tacos","date":"2024-01-01"}]"#));
        let resp = send(&state, request(Method::GET, "/")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[header::SERVER], "dinners-web");
        let html = body_text(resp).await;
        assert!(html.contains("Tacos"));
    }

    #[tokio::test]
    async fn test_page_route_invalid_json() {
        let (_root, state) = test_state(Some(r#"{"a":"#));
        let resp = send(&state, request(Method::GET, "/")).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(body_text(resp).await, "Failed to load dinners.json");
    }

    #[tokio::test]
    async fn test_page_route_empty_file() {
        let (_root, state) = test_state(Some(""));
        let resp = send(&state, request(Method::GET, "/")).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(body_text(resp).await, "Failed to load dinners.json");
    }

    #[tokio::test]
    async fn test_strict_schema_failure_is_uniform() {
        let (_root, state) = test_state(Some("{}"));
        let mut config = state.config.clone();
        config.data.schema = SchemaMode::Strict;
        let strict = Arc::new(AppState::new(&config));
        let resp = send(&strict, request(Method::GET, "/")).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(body_text(resp).await, "Failed to load dinners.json");
    }

    #[tokio::test]
    async fn test_etag_not_modified() {
        let (_root, state) = test_state(Some("[]"));
        let first = send(&state, request(Method::GET, "/__data.json")).await;
        let etag = first.headers()[header::ETAG].to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/__data.json")
            .header(header::IF_NONE_MATCH, &etag)
            .body(Empty::new())
            .unwrap();
        let second = send(&state, req).await;
        assert_eq!(second.status(), 304);
    }

    #[tokio::test]
    async fn test_etag_changes_with_file() {
        let (root, state) = test_state(Some("[]"));
        let first = send(&state, request(Method::GET, "/__data.json")).await;
        let etag = first.headers()[header::ETAG].to_str().unwrap().to_string();

        std::fs::write(root.path().join("dinners.json"), "[1]").unwrap();
        let req = Request::builder()
            .uri("/__data.json")
            .header(header::IF_NONE_MATCH, &etag)
            .body(Empty::new())
            .unwrap();
        let second = send(&state, req).await;
        assert_eq!(second.status(), 200);
        assert_eq!(body_text(second).await, r#"{"dinners":[1]}"#);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let (_root, state) = test_state(Some("[]"));
        let resp = send(&state, request(Method::HEAD, "/")).await;
        assert_eq!(resp.status(), 200);
        assert_ne!(resp.headers()[header::CONTENT_LENGTH], "0");
        assert_eq!(body_text(resp).await, "");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let (_root, state) = test_state(Some("[]"));
        let resp = send(&state, request(Method::POST, "/")).await;
        assert_eq!(resp.status(), 405);
    }

    #[tokio::test]
    async fn test_options() {
        let (_root, state) = test_state(Some("[]"));
        let resp = send(&state, request(Method::OPTIONS, "/")).await;
        assert_eq!(resp.status(), 204);
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let (_root, state) = test_state(Some("[]"));
        let req = Request::builder()
            .uri("/")
            .header(header::CONTENT_LENGTH, "99999999")
            .body(Empty::new())
            .unwrap();
        let resp = send(&state, req).await;
        assert_eq!(resp.status(), 413);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (_root, state) = test_state(Some("[]"));
        let resp = send(&state, request(Method::GET, "/nope")).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_health_probes() {
        let (_root, state) = test_state(Some("[]"));
        let live = send(&state, request(Method::GET, "/healthz")).await;
        assert_eq!(live.status(), 200);
        let ready = send(&state, request(Method::GET, "/readyz")).await;
        assert_eq!(ready.status(), 200);

        let (_root, missing) = test_state(None);
        let not_ready = send(&missing, request(Method::GET, "/readyz")).await;
        assert_eq!(not_ready.status(), 503);
        assert_eq!(body_text(not_ready).await, "not ready");
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let (_root, state) = test_state(Some(r#"[{"name":"Soup","date":"2024-02-02"}]"#));
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let state = Arc::clone(&state);
            tasks.push(tokio::spawn(async move {
                let resp = send(&state, request(Method::GET, "/__data.json")).await;
                body_text(resp).await
            }));
        }
        for task in tasks {
            let value: serde_json::Value = serde_json::from_str(&task.await.unwrap()).unwrap();
            assert_eq!(
                value,
                serde_json::json!({"dinners": [{"name": "Soup", "date": "2024-02-02"}]})
            );
        }
    }

    #[test]
    fn test_check_body_size() {
        assert!(check_body_size(None, 10).is_none());
        assert!(check_body_size(Some("10"), 10).is_none());
        assert!(check_body_size(Some("abc"), 10).is_none());
        assert_eq!(check_body_size(Some("11"), 10).unwrap().status(), 413);
    }
}
