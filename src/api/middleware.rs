//! Cross-cutting request middleware.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::time::Instant;
use tracing::info;

const ALLOW_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";

/// Permit every origin, method and header.
///
/// Preflight requests are answered directly with 204.
pub async fn cors_middleware(req: Request, next: Next) -> Response {
    let origin = req.headers().get("origin").cloned();
    let requested_headers = req
        .headers()
        .get("access-control-request-headers")
        .cloned();

    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        put_cors_headers(resp.headers_mut(), origin);
        resp.headers_mut().insert(
            "access-control-allow-methods",
            HeaderValue::from_static(ALLOW_METHODS),
        );
        resp.headers_mut().insert(
            "access-control-allow-headers",
            requested_headers.unwrap_or_else(|| HeaderValue::from_static("*")),
        );
        return resp;
    }

    let mut resp = next.run(req).await;
    put_cors_headers(resp.headers_mut(), origin);
    resp
}

fn put_cors_headers(headers: &mut HeaderMap, origin: Option<HeaderValue>) {
    match origin {
        Some(origin) => {
            // Credentials are allowed, so the wildcard cannot be used.
            headers.insert("access-control-allow-origin", origin);
            headers.insert(
                "access-control-allow-credentials",
                HeaderValue::from_static("true"),
            );
            headers.insert("vary", HeaderValue::from_static("Origin"));
        }
        None => {
            headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
        }
    }
}

/// Log method, path, status and latency of every request.
pub async fn request_log_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let resp = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = resp.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    resp
}
