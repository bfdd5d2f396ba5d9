//! Request context and cross-cutting layers.
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use medguard_core::RequestContext;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

/// Header carrying a caller-supplied trace id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Build a [`RequestContext`] for every request and attach it as an extension.
/// The peer address is only known when the server was started with connect info.
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let mut ctx = RequestContext::new();
    if let Some(id) = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        ctx = ctx.with_trace_id(id);
    }
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        ctx = ctx.with_ip(addr.ip().to_string());
    }
    req.extensions_mut().insert(ctx);
    next.run(req).await
}
