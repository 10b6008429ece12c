use crate::auth::{claims::AuthUser, extractors};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use headers::{HeaderMapExt, UserAgent};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::info;

/// Logs method, path, status, latency, client address, user agent and user
/// ID (if authenticated) for each request. CORS preflight `OPTIONS` requests are
/// passed through without logging.
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".into());
    let agent = req
        .headers()
        .typed_get::<UserAgent>()
        .map(|ua| ua.as_str().to_owned())
        .unwrap_or_default();
    let user = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extractors::token_from_header)
        .and_then(extractors::decode_token)
        .map(|claims| AuthUser(claims).id())
        .unwrap_or(0);

    let start = Instant::now();
    let response = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        ip = %ip,
        agent = %agent,
        user,
        "Handled request"
    );

    response
}
