use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::{error::ErrorReport, scope::RequestScope};

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-dns-prefetch-control", "on"),
    ("x-xss-protection", "1; mode=block"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-content-type-options", "nosniff"),
    (
        "permissions-policy",
        "camera=(), microphone=(), geolocation=(), usb=()",
    ),
];

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// Tag the request with an id and give it a fresh lookup scope.
pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let id = Uuid::new_v4();
    let ctx = RequestContext {
        request_id: id.to_string(),
    };
    request.extensions_mut().insert(ctx.clone());
    request.extensions_mut().insert(RequestScope::new(id));

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers
            .entry(HeaderName::from_static(name))
            .or_insert(HeaderValue::from_static(value));
    }
    response
}

/// Log every 4xx/5xx with the diagnostics its handler attached.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (source, chain) = response
        .extensions_mut()
        .remove::<ErrorReport>()
        .map_or(("unknown", Vec::new()), |report| {
            (report.source, report.messages)
        });
    let detail = chain
        .first()
        .map(String::as_str)
        .unwrap_or("no diagnostic available");
    let elapsed_ms = started.elapsed().as_millis();
    let path = uri.path();
    let query = uri.query().unwrap_or("");

    if status.is_server_error() {
        error!(
            target: "presswire::http::response",
            status = status.as_u16(),
            %method,
            path,
            query,
            elapsed_ms,
            source,
            detail,
            ?chain,
            request_id,
            "request failed"
        );
    } else {
        warn!(
            target: "presswire::http::response",
            status = status.as_u16(),
            %method,
            path,
            query,
            elapsed_ms,
            source,
            detail,
            ?chain,
            request_id,
            "client request error"
        );
    }

    response
}
